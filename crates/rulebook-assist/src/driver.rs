//! Assisted decomposition with deterministic fallback.
//!
//! Runs the [`attempt`](crate::attempt) state machine against a
//! [`GroupingProvider`]. An accepted answer goes through the reconstructor,
//! which copies content from the source, so a model can only select, merge
//! or omit sections. Anything else ends in the plain segmenter.

use rulebook_core::Section;
use rulebook_core::reconstruct::{
    Reconstruction, ReconstructionWarning, SchemaValidationError, parse_groupings, reconstruct,
};
use rulebook_core::segment::segment;
use tracing::{info, warn};

use crate::attempt::{AttemptOutcome, AttemptState, NextAction, next_state};
use crate::errors::{AssistError, AssistResult};
use crate::extract::extract_json;
use crate::provider::GroupingProvider;

/// Sections produced by an assisted decomposition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistedOutcome {
    /// Sections in output order.
    pub sections: Vec<Section>,
    /// Prose before the first section.
    pub preamble: Option<Section>,
    /// Reconstruction warnings from the accepted attempt.
    pub warnings: Vec<ReconstructionWarning>,
    /// Provider requests made.
    pub attempts: u32,
    /// Whether the segmenter produced the sections.
    pub fell_back: bool,
    /// Why the groupings were abandoned.
    pub reason: Option<String>,
}

/// Decompose `text` using groupings proposed by `provider`.
///
/// Never fails: provider errors, repeated invalid answers and groupings
/// that match nothing all end in [`segment`].
pub async fn assisted_decompose<P>(provider: &P, text: &str) -> AssistedOutcome
where
    P: GroupingProvider + ?Sized,
{
    let mut state = AttemptState::FirstAttempt;
    let mut attempts = 0;

    loop {
        let feedback = match state.next_action() {
            NextAction::Request { feedback } => feedback,
            NextAction::FallBack { reason } => {
                warn!(provider = provider.name(), attempts, %reason, "falling back to segmenter");
                return fallback(text, attempts, reason);
            }
        };

        attempts += 1;
        let outcome = match attempt(provider, text, feedback.as_deref()).await {
            Ok(reconstruction) => {
                info!(
                    provider = provider.name(),
                    attempts,
                    sections = reconstruction.sections.len(),
                    warnings = reconstruction.warnings.len(),
                    "groupings accepted"
                );
                return AssistedOutcome {
                    sections: reconstruction.sections,
                    preamble: reconstruction.preamble,
                    warnings: reconstruction.warnings,
                    attempts,
                    fell_back: false,
                    reason: None,
                };
            }
            Err(error) if error.is_correctable() => {
                warn!(provider = provider.name(), attempt = attempts, %error, "groupings rejected");
                AttemptOutcome::Correctable(error.to_string())
            }
            Err(error) => {
                warn!(provider = provider.name(), attempt = attempts, %error, "provider failed");
                AttemptOutcome::Fatal(error.to_string())
            }
        };

        match next_state(&state, outcome) {
            Some(next) => state = next,
            None => return fallback(text, attempts, "attempt loop ended".into()),
        }
    }
}

/// One provider request, validated and reconstructed.
async fn attempt<P>(provider: &P, text: &str, feedback: Option<&str>) -> AssistResult<Reconstruction>
where
    P: GroupingProvider + ?Sized,
{
    let raw = provider.propose(text, feedback).await?;
    let payload = extract_json(&raw).ok_or_else(|| {
        SchemaValidationError::Json("no JSON array or object in the answer".into())
    })?;
    let groupings = parse_groupings(payload)?;
    let reconstruction = reconstruct(text, &groupings);
    if reconstruction.sections.is_empty() {
        return Err(AssistError::EmptyReconstruction);
    }
    Ok(reconstruction)
}

fn fallback(text: &str, attempts: u32, reason: String) -> AssistedOutcome {
    let document = segment(text);
    AssistedOutcome {
        sections: document.sections,
        preamble: document.preamble,
        warnings: Vec::new(),
        attempts,
        fell_back: true,
        reason: Some(reason),
    }
}
