//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`Settings::default()`]
//! 2. Deep-merge `~/.rulebook/settings.json` if it exists
//! 3. Deep-merge `<project>/.rulebook.json` if it exists
//! 4. Apply `RULEBOOK_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use rulebook_core::Dialect;
use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::Settings;

/// Project-level settings filename.
pub const PROJECT_SETTINGS_FILE: &str = ".rulebook.json";

/// Accepted `assist.maxTokens` range.
pub const MAX_TOKENS_RANGE: (u32, u32) = (1, 200_000);

/// Accepted log levels.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Resolve the user settings file (`~/.rulebook/settings.json`).
pub fn user_settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".rulebook").join("settings.json")
}

/// Resolve the project settings file (`<project>/.rulebook.json`).
pub fn project_settings_path(project: &Path) -> PathBuf {
    project.join(PROJECT_SETTINGS_FILE)
}

/// Load user and project settings with env var overrides.
pub fn load_settings(project: Option<&Path>) -> Result<Settings> {
    let mut paths = vec![user_settings_path()];
    if let Some(project) = project {
        paths.push(project_settings_path(project));
    }
    load_settings_from_paths(&paths)
}

/// Load settings from `paths` (later files win) with env var overrides.
///
/// Missing files are skipped. A file with invalid JSON is an error.
pub fn load_settings_from_paths(paths: &[PathBuf]) -> Result<Settings> {
    let mut settings = merge_files(paths)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Deep-merge `paths` over the defaults without consulting the environment.
pub fn merge_files(paths: &[PathBuf]) -> Result<Settings> {
    let mut merged = serde_json::to_value(Settings::default())?;

    for path in paths {
        if !path.exists() {
            debug!(?path, "settings file not found, skipping");
            continue;
        }
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let layer: Value = serde_json::from_str(&content)?;
        merged = deep_merge(merged, layer);
    }

    let settings: Settings = serde_json::from_value(merged)?;
    validate(&settings)?;
    Ok(settings)
}

/// Check values that deserialize fine but cannot be used.
pub fn validate(settings: &Settings) -> Result<()> {
    let (min, max) = MAX_TOKENS_RANGE;
    if !(min..=max).contains(&settings.assist.max_tokens) {
        return Err(SettingsError::InvalidValue(format!(
            "assist.maxTokens must be within {min}..={max}, got {}",
            settings.assist.max_tokens
        )));
    }
    if settings.assist.timeout_ms == 0 {
        return Err(SettingsError::InvalidValue(
            "assist.timeoutMs must be positive".to_string(),
        ));
    }
    if parse_log_level(&settings.logging.level).is_none() {
        return Err(SettingsError::InvalidValue(format!(
            "logging.level must be one of {}, got {:?}",
            LOG_LEVELS.join(", "),
            settings.logging.level
        )));
    }
    Ok(())
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are logged and ignored (file/default value wins).
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Some(v) = read_env_dialect("RULEBOOK_DIALECT") {
        settings.default_dialect = v;
    }
    if let Some(v) = read_env_bool("RULEBOOK_NUMBERED") {
        settings.decompose.numbered = v;
    }
    if let Some(v) = read_env_bool("RULEBOOK_ASSIST") {
        settings.assist.enabled = v;
    }
    if let Some(v) = read_env_string("RULEBOOK_MODEL") {
        settings.assist.model = v;
    }
    if let Some(v) = read_env_string("RULEBOOK_BASE_URL") {
        settings.assist.base_url = v;
    }
    let (min_tokens, max_tokens) = MAX_TOKENS_RANGE;
    if let Some(v) = read_env_u32("RULEBOOK_MAX_TOKENS", min_tokens, max_tokens) {
        settings.assist.max_tokens = v;
    }
    if let Some(v) = read_env_log_level("RULEBOOK_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a log level, normalized to lowercase.
pub fn parse_log_level(val: &str) -> Option<String> {
    let level = val.trim().to_ascii_lowercase();
    LOG_LEVELS.contains(&level.as_str()).then_some(level)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

fn read_env_dialect(name: &str) -> Option<Dialect> {
    let val = read_env_string(name)?;
    match val.parse::<Dialect>() {
        Ok(dialect) => Some(dialect),
        Err(error) => {
            tracing::warn!(key = name, value = %val, %error, "invalid dialect env var, ignoring");
            None
        }
    }
}

fn read_env_log_level(name: &str) -> Option<String> {
    let val = read_env_string(name)?;
    let result = parse_log_level(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid log level env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
