//! # rulebook-assist
//!
//! Model-assisted decomposition. A [`GroupingProvider`] proposes which
//! level-2 headings belong together; the proposal is extracted, validated
//! and handed to the reconstructor, which copies content from the source.
//!
//! The retry policy is a small state machine ([`attempt`]): one retry with
//! the validation error fed back, then the deterministic segmenter takes
//! over. [`assisted_decompose`] never fails.

#![deny(unsafe_code)]

pub mod anthropic;
pub mod attempt;
pub mod driver;
pub mod errors;
pub mod extract;
pub mod prompt;
pub mod provider;

pub use anthropic::{AnthropicConfig, AnthropicGroupingProvider};
pub use driver::{AssistedOutcome, assisted_decompose};
pub use errors::{AssistError, AssistResult};
pub use provider::GroupingProvider;
