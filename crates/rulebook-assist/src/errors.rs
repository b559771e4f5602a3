//! Assist error types.

use rulebook_core::reconstruct::SchemaValidationError;

/// Result type alias for assist operations.
pub type AssistResult<T> = Result<T, AssistError>;

/// Errors raised while asking a model for groupings.
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },

    /// The response carried no text.
    #[error("model returned no text")]
    EmptyResponse,

    /// The API key environment variable is unset or empty.
    #[error("API key not found in ${0}")]
    MissingApiKey(String),

    /// The proposed groupings do not have the required shape.
    #[error("invalid groupings: {0}")]
    Schema(#[from] SchemaValidationError),

    /// Valid groupings resolved no headings at all.
    #[error("groupings matched no headings in the document")]
    EmptyReconstruction,
}

impl AssistError {
    /// Whether the failure is about the model's answer and worth one retry.
    ///
    /// Transport and API failures are not retried.
    pub fn is_correctable(&self) -> bool {
        matches!(self, Self::Schema(_) | Self::EmptyReconstruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correctable_variants() {
        assert!(AssistError::Schema(SchemaValidationError::Empty).is_correctable());
        assert!(AssistError::EmptyReconstruction.is_correctable());
        assert!(!AssistError::EmptyResponse.is_correctable());
        assert!(
            !AssistError::Api {
                status: 529,
                message: "overloaded".into()
            }
            .is_correctable()
        );
    }

    #[test]
    fn display_messages() {
        let err = AssistError::MissingApiKey("ANTHROPIC_API_KEY".into());
        assert_eq!(err.to_string(), "API key not found in $ANTHROPIC_API_KEY");

        let err = AssistError::Api {
            status: 401,
            message: "invalid x-api-key".into(),
        };
        assert_eq!(err.to_string(), "API error (401): invalid x-api-key");

        let err: AssistError = SchemaValidationError::Empty.into();
        assert_eq!(err.to_string(), "invalid groupings: no groupings supplied");
    }
}
