//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`,
//! so a settings file may name only the fields it changes.

use rulebook_core::compose::ComposeOptions;
use rulebook_core::decompose::DecomposeOptions;
use rulebook_core::{Dialect, SectionKind};
use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// ```json
/// {
///   "defaultDialect": "claude",
///   "compose": { "title": "Agent Guide" },
///   "assist": { "enabled": true }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Dialect used for rule files when none is given.
    pub default_dialect: Dialect,
    /// Canonical layout directory names.
    pub layout: LayoutSettings,
    /// Decomposition toggles.
    pub decompose: DecomposeSettings,
    /// Composition toggles.
    pub compose: ComposeSettings,
    /// Model-assisted grouping.
    pub assist: AssistSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Directory names of the canonical layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSettings {
    /// Rule files.
    pub rules_dir: String,
    /// Skill files.
    pub skills_dir: String,
    /// Agent files.
    pub agents_dir: String,
    /// Command files.
    pub commands_dir: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            rules_dir: SectionKind::Rule.default_dir().to_string(),
            skills_dir: SectionKind::Skill.default_dir().to_string(),
            agents_dir: SectionKind::Agent.default_dir().to_string(),
            commands_dir: SectionKind::Command.default_dir().to_string(),
        }
    }
}

impl LayoutSettings {
    /// Directory name for a section kind.
    pub fn dir_for(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::Rule => &self.rules_dir,
            SectionKind::Skill => &self.skills_dir,
            SectionKind::Agent => &self.agents_dir,
            SectionKind::Command => &self.commands_dir,
        }
    }
}

/// Decomposition toggles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecomposeSettings {
    /// Prefix filenames with their position.
    pub numbered: bool,
    /// Rewrite anchors into relative links.
    pub resolve_links: bool,
    /// Promote headings so files carry `# Title`.
    pub promote_headings: bool,
}

impl Default for DecomposeSettings {
    fn default() -> Self {
        let options = DecomposeOptions::default();
        Self {
            numbered: options.numbered,
            resolve_links: options.resolve_links,
            promote_headings: options.promote_headings,
        }
    }
}

impl DecomposeSettings {
    /// Options for [`rulebook_core::decompose::decompose`].
    pub fn options(&self) -> DecomposeOptions {
        DecomposeOptions {
            numbered: self.numbered,
            resolve_links: self.resolve_links,
            promote_headings: self.promote_headings,
        }
    }
}

/// Composition toggles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComposeSettings {
    /// Strip rule-file frontmatter.
    pub strip_frontmatter: bool,
    /// Resolve placeholders for the target dialect.
    pub resolve_placeholders: bool,
    /// Rewrite relative links into anchors.
    pub resolve_links: bool,
    /// Push headings one level deeper.
    pub shift_headings: bool,
    /// Re-inject metadata callouts.
    pub inject_metadata: bool,
    /// Renumber section headings.
    pub number_sections: bool,
    /// Inject description blockquotes too.
    pub inject_descriptions: bool,
    /// Optional document title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        let options = ComposeOptions::default();
        Self {
            strip_frontmatter: options.strip_frontmatter,
            resolve_placeholders: options.resolve_placeholders,
            resolve_links: options.resolve_links,
            shift_headings: options.shift_headings,
            inject_metadata: options.inject_metadata,
            number_sections: options.number_sections,
            inject_descriptions: options.inject_descriptions,
            title: options.title,
        }
    }
}

impl ComposeSettings {
    /// Options for [`rulebook_core::compose::compose`].
    pub fn options(&self) -> ComposeOptions {
        ComposeOptions {
            strip_frontmatter: self.strip_frontmatter,
            resolve_placeholders: self.resolve_placeholders,
            resolve_links: self.resolve_links,
            shift_headings: self.shift_headings,
            inject_metadata: self.inject_metadata,
            number_sections: self.number_sections,
            inject_descriptions: self.inject_descriptions,
            title: self.title.clone(),
        }
    }
}

/// Model-assisted grouping settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistSettings {
    /// Use the model to propose groupings during decomposition.
    pub enabled: bool,
    /// Messages API base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Response token budget.
    pub max_tokens: u32,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: 8192,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            timeout_ms: 120_000,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
