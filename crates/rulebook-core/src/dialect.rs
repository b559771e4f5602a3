//! Supported downstream tools.
//!
//! Each [`Dialect`] fixes a file extension, a frontmatter flavor and a
//! [`PlaceholderTable`]. The table is a struct with one field per variable,
//! so every dialect defines the same key set by construction. A tool without
//! a concept (Cursor has no skills) sets the value to `""`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::frontmatter::FrontmatterFlavor;

/// A downstream tool's file layout, extension and metadata encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Claude Code (`CLAUDE.md`, `.claude/`).
    Claude,
    /// Cursor (`.cursor/rules/*.mdc`).
    #[default]
    Cursor,
    /// Windsurf (`.windsurf/rules/*.md`).
    Windsurf,
    /// GitHub Copilot (`.github/instructions/*.instructions.md`).
    Copilot,
    /// Codex (`AGENTS.md`).
    Codex,
}

impl Dialect {
    /// Every dialect, in detection tie-break order.
    pub const ALL: [Dialect; 5] = [
        Self::Claude,
        Self::Cursor,
        Self::Windsurf,
        Self::Copilot,
        Self::Codex,
    ];

    /// Lowercase identifier used on the command line and in settings.
    pub fn id(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Cursor => "cursor",
            Self::Windsurf => "windsurf",
            Self::Copilot => "copilot",
            Self::Codex => "codex",
        }
    }

    /// Human-readable tool name.
    pub fn display_name(self) -> &'static str {
        self.placeholders().tool_name
    }

    /// Extension (without dot) of modular rule files.
    pub fn rules_extension(self) -> &'static str {
        match self {
            Self::Cursor => "mdc",
            Self::Claude | Self::Windsurf | Self::Copilot | Self::Codex => "md",
        }
    }

    /// Conventional filename of the composed monolithic document.
    pub fn composed_filename(self) -> &'static str {
        match self {
            Self::Claude => "CLAUDE.md",
            Self::Cursor | Self::Codex => "AGENTS.md",
            Self::Windsurf => ".windsurfrules",
            Self::Copilot => ".github/copilot-instructions.md",
        }
    }

    /// How rule files of this dialect encode per-section metadata.
    pub fn frontmatter_flavor(self) -> FrontmatterFlavor {
        match self {
            Self::Claude => FrontmatterFlavor::Claude,
            Self::Cursor => FrontmatterFlavor::Cursor,
            Self::Windsurf => FrontmatterFlavor::Windsurf,
            Self::Copilot => FrontmatterFlavor::Copilot,
            Self::Codex => FrontmatterFlavor::Callouts,
        }
    }

    /// Placeholder values for this dialect.
    pub fn placeholders(self) -> &'static PlaceholderTable {
        match self {
            Self::Claude => &CLAUDE,
            Self::Cursor => &CURSOR,
            Self::Windsurf => &WINDSURF,
            Self::Copilot => &COPILOT,
            Self::Codex => &CODEX,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.id() == needle)
            .ok_or_else(|| format!("unknown dialect: {s}"))
    }
}

/// Placeholder variable names, in table order.
pub const PLACEHOLDER_NAMES: [&str; 10] = [
    "TOOL_NAME",
    "RULES_DIR",
    "RULES_EXT",
    "SKILLS_DIR",
    "SKILLS_EXT",
    "GLOBAL_RULES",
    "GLOBAL_SKILLS",
    "RULE_EXAMPLE",
    "AGENTS_DIR",
    "COMMANDS_DIR",
];

/// Variables whose values identify a dialect in existing text.
pub const SIGNAL_NAMES: [&str; 5] = [
    "RULES_DIR",
    "SKILLS_DIR",
    "GLOBAL_RULES",
    "GLOBAL_SKILLS",
    "RULE_EXAMPLE",
];

/// Literal values a dialect substitutes for `{{NAME}}` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderTable {
    /// `{{TOOL_NAME}}`
    pub tool_name: &'static str,
    /// `{{RULES_DIR}}`
    pub rules_dir: &'static str,
    /// `{{RULES_EXT}}`
    pub rules_ext: &'static str,
    /// `{{SKILLS_DIR}}`
    pub skills_dir: &'static str,
    /// `{{SKILLS_EXT}}`
    pub skills_ext: &'static str,
    /// `{{GLOBAL_RULES}}`
    pub global_rules: &'static str,
    /// `{{GLOBAL_SKILLS}}`
    pub global_skills: &'static str,
    /// `{{RULE_EXAMPLE}}`
    pub rule_example: &'static str,
    /// `{{AGENTS_DIR}}`
    pub agents_dir: &'static str,
    /// `{{COMMANDS_DIR}}`
    pub commands_dir: &'static str,
}

impl PlaceholderTable {
    /// Look up a variable by its token name.
    pub fn get(&self, name: &str) -> Option<&'static str> {
        let value = match name {
            "TOOL_NAME" => self.tool_name,
            "RULES_DIR" => self.rules_dir,
            "RULES_EXT" => self.rules_ext,
            "SKILLS_DIR" => self.skills_dir,
            "SKILLS_EXT" => self.skills_ext,
            "GLOBAL_RULES" => self.global_rules,
            "GLOBAL_SKILLS" => self.global_skills,
            "RULE_EXAMPLE" => self.rule_example,
            "AGENTS_DIR" => self.agents_dir,
            "COMMANDS_DIR" => self.commands_dir,
            _ => return None,
        };
        Some(value)
    }

    /// `(name, value)` pairs in [`PLACEHOLDER_NAMES`] order.
    pub fn entries(&self) -> Vec<(&'static str, &'static str)> {
        PLACEHOLDER_NAMES
            .iter()
            .filter_map(|name| self.get(name).map(|value| (*name, value)))
            .collect()
    }
}

static CLAUDE: PlaceholderTable = PlaceholderTable {
    tool_name: "Claude Code",
    rules_dir: ".claude/rules",
    rules_ext: ".md",
    skills_dir: ".claude/skills",
    skills_ext: "SKILL.md",
    global_rules: "~/.claude/CLAUDE.md",
    global_skills: "~/.claude/skills",
    rule_example: ".claude/rules/testing.md",
    agents_dir: ".claude/agents",
    commands_dir: ".claude/commands",
};

static CURSOR: PlaceholderTable = PlaceholderTable {
    tool_name: "Cursor",
    rules_dir: ".cursor/rules",
    rules_ext: ".mdc",
    skills_dir: "",
    skills_ext: "",
    global_rules: "",
    global_skills: "",
    rule_example: ".cursor/rules/testing.mdc",
    agents_dir: "",
    commands_dir: ".cursor/commands",
};

static WINDSURF: PlaceholderTable = PlaceholderTable {
    tool_name: "Windsurf",
    rules_dir: ".windsurf/rules",
    rules_ext: ".md",
    skills_dir: "",
    skills_ext: "",
    global_rules: "~/.codeium/windsurf/memories/global_rules.md",
    global_skills: "",
    rule_example: ".windsurf/rules/testing.md",
    agents_dir: "",
    commands_dir: ".windsurf/workflows",
};

static COPILOT: PlaceholderTable = PlaceholderTable {
    tool_name: "GitHub Copilot",
    rules_dir: ".github/instructions",
    rules_ext: ".instructions.md",
    skills_dir: "",
    skills_ext: "",
    global_rules: "",
    global_skills: "",
    rule_example: ".github/instructions/testing.instructions.md",
    agents_dir: ".github/agents",
    commands_dir: ".github/prompts",
};

static CODEX: PlaceholderTable = PlaceholderTable {
    tool_name: "Codex",
    rules_dir: "",
    rules_ext: ".md",
    skills_dir: "",
    skills_ext: "",
    global_rules: "~/.codex/AGENTS.md",
    global_skills: "",
    rule_example: "",
    agents_dir: "",
    commands_dir: "~/.codex/prompts",
};
