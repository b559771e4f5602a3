//! # Grouping provider
//!
//! The one capability the assisted pipeline needs from a model: given the
//! whole document, return raw text that should contain a grouping payload.
//! Validation, retries and fallback live in [`crate::driver`], so a provider
//! is a plain request/response adapter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::AssistResult;

/// Proposes section groupings for a document.
#[async_trait]
pub trait GroupingProvider: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Ask for groupings.
    ///
    /// `feedback` is set on a retry and carries the reason the previous
    /// answer was rejected.
    async fn propose(&self, document: &str, feedback: Option<&str>) -> AssistResult<String>;
}

#[async_trait]
impl<T: GroupingProvider + ?Sized> GroupingProvider for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn propose(&self, document: &str, feedback: Option<&str>) -> AssistResult<String> {
        (**self).propose(document, feedback).await
    }
}
