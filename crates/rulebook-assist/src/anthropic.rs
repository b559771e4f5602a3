//! Anthropic Messages API grouping provider.
//!
//! Sends one non-streaming request per proposal and returns the concatenated
//! text blocks of the reply.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use rulebook_settings::AssistSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AssistError, AssistResult};
use crate::prompt::{SYSTEM_PROMPT, user_message};
use crate::provider::GroupingProvider;

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// Connection settings for [`AnthropicGroupingProvider`].
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// API key sent as `x-api-key`.
    pub api_key: String,
    /// Base URL without the `/v1/messages` suffix.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Response token budget.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Build a config from settings, reading the key from `settings.api_key_env`.
    pub fn from_settings(settings: &AssistSettings) -> AssistResult<Self> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AssistError::MissingApiKey(settings.api_key_env.clone()))?;
        Ok(Self::with_key(api_key, settings))
    }

    /// Build a config from settings with an explicit key.
    pub fn with_key(api_key: impl Into<String>, settings: &AssistSettings) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<RequestMessage>,
}

#[derive(Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Grouping provider backed by the Anthropic Messages API.
pub struct AnthropicGroupingProvider {
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicGroupingProvider {
    /// Create a provider with its own HTTP client.
    pub fn new(config: AnthropicConfig) -> AssistResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Create a provider with a shared HTTP client.
    #[must_use]
    pub fn with_client(config: AnthropicConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Model this provider asks.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_headers(&self) -> AssistResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let _ = headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        let key = HeaderValue::from_str(&self.config.api_key).map_err(|e| AssistError::Api {
            status: 0,
            message: format!("invalid API key header: {e}"),
        })?;
        let _ = headers.insert("x-api-key", key);
        Ok(headers)
    }
}

#[async_trait]
impl GroupingProvider for AnthropicGroupingProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn propose(&self, document: &str, feedback: Option<&str>) -> AssistResult<String> {
        let url = format!("{}/v1/messages", self.config.base_url);
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![RequestMessage {
                role: "user",
                content: user_message(document, feedback),
            }],
        };

        debug!(
            model = %self.config.model,
            chars = document.len(),
            retry = feedback.is_some(),
            "requesting groupings"
        );
        let response = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AssistError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)?;
        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(AssistError::EmptyResponse);
        }
        debug!(chars = text.len(), "received groupings");
        Ok(text)
    }
}

/// Pull `error.message` out of an API error body, else use the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
