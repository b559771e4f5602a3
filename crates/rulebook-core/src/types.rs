//! Core types shared by every transformation.
//!
//! All types use `camelCase` serde renaming so decomposition results can be
//! emitted as JSON by the command line.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::lines::tokenize;

/// Reserved name of the preamble section.
pub const PREAMBLE_NAME: &str = "preamble";

/// What a section is used for downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Instruction rule (default, never annotated).
    #[default]
    Rule,
    /// Reusable skill.
    Skill,
    /// Subagent definition.
    Agent,
    /// Slash command.
    Command,
}

impl SectionKind {
    /// All kinds in canonical layout order.
    pub const ALL: [SectionKind; 4] = [Self::Rule, Self::Skill, Self::Agent, Self::Command];

    /// Lowercase identifier used in callouts and frontmatter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Skill => "skill",
            Self::Agent => "agent",
            Self::Command => "command",
        }
    }

    /// Default canonical-layout directory for this kind.
    pub fn default_dir(self) -> &'static str {
        match self {
            Self::Rule => "rules",
            Self::Skill => "skills",
            Self::Agent => "agents",
            Self::Command => "commands",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rule" => Ok(Self::Rule),
            "skill" => Ok(Self::Skill),
            "agent" => Ok(Self::Agent),
            "command" => Ok(Self::Command),
            other => Err(format!("unknown section kind: {other}")),
        }
    }
}

/// One concern of the document: a top-level heading and everything under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Slug used for filenames and anchors.
    pub name: String,
    /// Short summary (at most 120 characters).
    pub description: String,
    /// Markdown body, starting with the section's own heading line.
    pub content: String,
    /// Optional grouping path below the kind directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    /// Comma-separated file-glob scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub globs: Option<String>,
    /// Tri-state apply flag; unset means always applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_apply: Option<bool>,
    /// Section kind.
    #[serde(default)]
    pub kind: SectionKind,
}

impl Section {
    /// Create a plain rule section with no metadata.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            content: content.into(),
            directory: None,
            globs: None,
            always_apply: None,
            kind: SectionKind::Rule,
        }
    }

    /// Whether the section applies everywhere (unset counts as `true`).
    pub fn is_always_applied(&self) -> bool {
        self.always_apply.unwrap_or(true)
    }

    /// Text of the first heading line, if the content starts with one.
    pub fn title(&self) -> Option<&str> {
        tokenize(&self.content)
            .into_iter()
            .find(|l| !l.is_blank())
            .and_then(|l| l.heading())
            .map(|(_, text)| text)
    }

    /// Whether this is the reserved preamble section.
    pub fn is_preamble(&self) -> bool {
        self.name == PREAMBLE_NAME
    }
}

/// An ordered list of sections plus an optional preamble.
///
/// Identity is purely positional: section `i` (0-based) has position `i + 1`
/// in headings, filenames and anchors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Meaningful prose preceding the first section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preamble: Option<Section>,
    /// Sections in document order.
    pub sections: Vec<Section>,
}

impl Document {
    /// Number of sections (the preamble is not counted).
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the document has neither sections nor a preamble.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.preamble.is_none()
    }

    /// Section names in position order.
    pub fn names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}
