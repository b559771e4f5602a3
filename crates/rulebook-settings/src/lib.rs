//! # rulebook-settings
//!
//! Layered configuration for the rulebook tooling.
//!
//! Settings are loaded from four layers (in priority order):
//! 1. **Compiled defaults**: [`Settings::default()`]
//! 2. **User file**: `~/.rulebook/settings.json`
//! 3. **Project file**: `<project>/.rulebook.json`
//! 4. **Environment variables**: `RULEBOOK_*` overrides (highest priority)
//!
//! Files are deep-merged over the defaults, so each layer only names the
//! values it changes.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_paths, merge_files,
    project_settings_path, user_settings_path, validate,
};
pub use types::*;
