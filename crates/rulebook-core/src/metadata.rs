//! Inline metadata callouts.
//!
//! Right after a section's heading line, metadata travels as a run of
//! blockquote lines:
//!
//! ```text
//! ## Testing
//! > Run the suite before every push.
//! > [!globs] src/**/*.rs, tests/**
//! > [!alwaysApply] false
//! > [!type] skill
//! ```
//!
//! Any subset in any order may appear. Unknown callouts (`> [!NOTE]`) end the
//! run and stay in the content.

use crate::lines::{Line, LineKind, tokenize};
use crate::slug::truncate_description;
use crate::types::{Section, SectionKind};

/// Callout kind carrying the glob scope.
pub const GLOBS_CALLOUT: &str = "globs";
/// Callout kind carrying the explicit apply flag.
pub const ALWAYS_APPLY_CALLOUT: &str = "alwaysApply";
/// Callout kind carrying the section kind.
pub const TYPE_CALLOUT: &str = "type";

/// Metadata lifted out of a section body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMetadata {
    /// Content with every recognized metadata line removed.
    pub content: String,
    /// Description blockquote, capped at 120 characters.
    pub description: Option<String>,
    /// Comma-separated globs from the scope callout.
    pub globs: Option<String>,
    /// Resolved apply flag (`true` unless scoped or explicitly disabled).
    pub always_apply: bool,
    /// Whether a scope or apply-flag callout was present at all.
    pub scope_declared: bool,
    /// Kind from the kind callout.
    pub kind: Option<SectionKind>,
}

impl ExtractedMetadata {
    /// Tri-state apply flag as stored on a [`Section`].
    pub fn always_apply_flag(&self) -> Option<bool> {
        self.scope_declared.then_some(self.always_apply)
    }

    /// Copy the extracted values onto `section`, replacing its content.
    ///
    /// Values already set on the section win over absent callouts; present
    /// callouts win over the section.
    pub fn apply_to(self, section: &mut Section) {
        if let Some(description) = self.description {
            section.description = description;
        }
        if self.globs.is_some() {
            section.globs = self.globs;
        }
        if let Some(flag) = self.scope_declared.then_some(self.always_apply) {
            section.always_apply = Some(flag);
        }
        if let Some(kind) = self.kind {
            section.kind = kind;
        }
        section.content = self.content;
    }
}

/// Metadata to write back into a section body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBlock {
    /// Description blockquote (written only when present and non-empty).
    pub description: Option<String>,
    /// Glob list for the scope callout.
    pub globs: Option<String>,
    /// Tri-state apply flag; only `Some(false)` produces a scope callout.
    pub always_apply: Option<bool>,
    /// Section kind; `Rule` is implicit and never annotated.
    pub kind: SectionKind,
}

impl MetadataBlock {
    /// Build a block from a section, optionally carrying its description.
    pub fn from_section(section: &Section, with_description: bool) -> Self {
        Self {
            description: with_description
                .then(|| section.description.clone())
                .filter(|d| !d.trim().is_empty()),
            globs: section.globs.clone(),
            always_apply: section.always_apply,
            kind: section.kind,
        }
    }

    /// Callout lines for this block, in canonical order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(description) = self.description.as_deref() {
            let description = truncate_description(description);
            if !description.is_empty() {
                lines.push(format!("> {description}"));
            }
        }
        if self.always_apply == Some(false) {
            match self.globs.as_deref().map(str::trim) {
                Some(globs) if !globs.is_empty() => {
                    lines.push(format!("> [!{GLOBS_CALLOUT}] {globs}"));
                }
                _ => lines.push(format!("> [!{GLOBS_CALLOUT}]")),
            }
        }
        if self.kind != SectionKind::Rule {
            lines.push(format!("> [!{TYPE_CALLOUT}] {}", self.kind));
        }
        lines
    }
}

/// Lift the metadata run that follows the first heading out of `content`.
///
/// When nothing is recognized the content is returned unchanged. Otherwise
/// the heading is followed by exactly one blank line and the remaining body.
pub fn extract_metadata(content: &str) -> ExtractedMetadata {
    extract(content, true)
}

/// Lift only the scope, apply-flag and kind callouts.
///
/// Used for bodies whose description already lives elsewhere (frontmatter),
/// so a leading blockquote stays prose.
pub fn extract_callouts(content: &str) -> ExtractedMetadata {
    extract(content, false)
}

fn extract(content: &str, with_description: bool) -> ExtractedMetadata {
    let lines = tokenize(content);
    let start = usize::from(lines.first().is_some_and(|l| l.heading().is_some()));

    let mut found = Found::default();
    let mut recognized = false;
    let mut i = start;

    while i < lines.len() {
        let line = lines[i];
        if line.fenced {
            break;
        }
        match line.kind {
            LineKind::Blank => {
                i += 1;
                continue;
            }
            LineKind::Callout { kind, args } => {
                if !found.accept_callout(kind, args) {
                    break;
                }
            }
            LineKind::Blockquote { .. } if with_description && found.description.is_none() => {
                let (description, next) = read_blockquote(&lines, i);
                found.description = Some(truncate_description(&description));
                recognized = true;
                i = next;
                continue;
            }
            _ => break,
        }
        recognized = true;
        i += 1;
    }

    if !recognized {
        return ExtractedMetadata {
            content: content.to_string(),
            description: None,
            globs: None,
            always_apply: true,
            scope_declared: false,
            kind: None,
        };
    }

    let head: Vec<&str> = lines[..start].iter().map(|l| l.raw).collect();
    let rest: Vec<&str> = lines[i..].iter().map(|l| l.raw).collect();
    let rest = rest.join("\n");

    let cleaned = match (head.is_empty(), rest.is_empty()) {
        (true, _) => rest,
        (false, true) => head.join("\n"),
        (false, false) => format!("{}\n\n{rest}", head.join("\n")),
    };

    let scope_declared = found.scoped || found.explicit_apply.is_some();
    ExtractedMetadata {
        content: cleaned,
        description: found.description.filter(|d| !d.is_empty()),
        globs: found.globs.filter(|g| !g.is_empty()),
        always_apply: found.explicit_apply.unwrap_or(!found.scoped),
        scope_declared,
        kind: found.kind,
    }
}

/// Write `block` right after the first heading line of `content`.
///
/// Content without a heading gets the annotations at the very front. A block
/// that renders no lines leaves the content untouched.
pub fn inject_metadata(content: &str, block: &MetadataBlock) -> String {
    let annotations = block.lines();
    if annotations.is_empty() {
        return content.to_string();
    }
    let annotations = annotations.join("\n");

    let lines = tokenize(content);
    let has_heading = lines.first().is_some_and(|l| l.heading().is_some());
    if !has_heading {
        let body = content.trim_start_matches(['\n', '\r']);
        if body.trim().is_empty() {
            return annotations;
        }
        return format!("{annotations}\n\n{body}");
    }

    let heading = lines[0].raw;
    let rest_start = lines[1..]
        .iter()
        .position(|l| !l.is_blank())
        .map_or(lines.len(), |p| p + 1);
    let rest: Vec<&str> = lines[rest_start..].iter().map(|l| l.raw).collect();
    if rest.is_empty() {
        format!("{heading}\n\n{annotations}")
    } else {
        format!("{heading}\n\n{annotations}\n\n{}", rest.join("\n"))
    }
}

/// Inject the metadata a section carries.
///
/// Sections that always apply get no scope callout; rule sections get no
/// kind callout.
pub fn inject_section_metadata(section: &Section, with_description: bool) -> String {
    inject_metadata(
        &section.content,
        &MetadataBlock::from_section(section, with_description),
    )
}

#[derive(Default)]
struct Found {
    description: Option<String>,
    globs: Option<String>,
    scoped: bool,
    explicit_apply: Option<bool>,
    kind: Option<SectionKind>,
}

impl Found {
    /// Record a recognized callout; `false` means it ends the run.
    fn accept_callout(&mut self, kind: &str, args: &str) -> bool {
        if kind.eq_ignore_ascii_case(GLOBS_CALLOUT) && !self.scoped {
            self.scoped = true;
            self.globs = Some(normalize_globs(args));
            return true;
        }
        if kind.eq_ignore_ascii_case(ALWAYS_APPLY_CALLOUT) && self.explicit_apply.is_none() {
            return match args.trim().to_ascii_lowercase().as_str() {
                "true" => {
                    self.explicit_apply = Some(true);
                    true
                }
                "false" => {
                    self.explicit_apply = Some(false);
                    true
                }
                _ => false,
            };
        }
        if kind.eq_ignore_ascii_case(TYPE_CALLOUT) && self.kind.is_none() {
            return match args.parse::<SectionKind>() {
                Ok(parsed) => {
                    self.kind = Some(parsed);
                    true
                }
                Err(_) => false,
            };
        }
        false
    }
}

/// Join consecutive plain blockquote lines into one description.
fn read_blockquote(lines: &[Line<'_>], start: usize) -> (String, usize) {
    let mut parts = Vec::new();
    let mut i = start;
    while let Some(line) = lines.get(i) {
        match line.kind {
            LineKind::Blockquote { text } if !line.fenced => {
                if !text.is_empty() {
                    parts.push(text);
                }
                i += 1;
            }
            _ => break,
        }
    }
    (parts.join(" "), i)
}

/// Normalize a comma-separated glob list to `a, b, c`.
pub fn normalize_globs(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_full_block_in_any_order() {
        let content = "## Testing\n> [!type] skill\n> [!globs] src/**,tests/**\n> Run tests\n> before pushing.\n\nBody text.";
        let meta = extract_metadata(content);
        assert_eq!(meta.content, "## Testing\n\nBody text.");
        assert_eq!(meta.description.as_deref(), Some("Run tests before pushing."));
        assert_eq!(meta.globs.as_deref(), Some("src/**, tests/**"));
        assert!(!meta.always_apply);
        assert_eq!(meta.kind, Some(SectionKind::Skill));
    }

    #[test]
    fn absent_apply_flag_means_always() {
        let meta = extract_metadata("## A\n> Summary\n\nBody");
        assert!(meta.always_apply);
        assert!(!meta.scope_declared);
        assert_eq!(meta.always_apply_flag(), None);
    }

    #[test]
    fn explicit_apply_flag_wins_over_scope() {
        let meta = extract_metadata("## A\n> [!globs] *.rs\n> [!alwaysApply] true\nBody");
        assert!(meta.always_apply);
        assert_eq!(meta.always_apply_flag(), Some(true));
        assert_eq!(meta.content, "## A\n\nBody");
    }

    #[test]
    fn empty_scope_callout_disables_always_apply() {
        let meta = extract_metadata("## A\n\n> [!globs]\n\nBody");
        assert!(!meta.always_apply);
        assert_eq!(meta.globs, None);
        assert_eq!(meta.content, "## A\n\nBody");
    }

    #[test]
    fn unknown_callouts_pass_through() {
        let content = "## A\n> [!NOTE] Careful\n> details";
        let meta = extract_metadata(content);
        assert_eq!(meta.content, content);
        assert_eq!(meta.description, None);
    }

    #[test]
    fn invalid_kind_value_is_content() {
        let content = "## A\n> [!type] workflow\nBody";
        assert_eq!(extract_metadata(content).content, content);
    }

    #[test]
    fn no_metadata_leaves_content_untouched() {
        let content = "## A\nBody\n\n> a later quote";
        let meta = extract_metadata(content);
        assert_eq!(meta.content, content);
        assert!(meta.always_apply);
    }

    #[test]
    fn metadata_after_body_is_not_extracted() {
        let content = "## A\n\nBody\n> [!globs] x";
        assert_eq!(extract_metadata(content).content, content);
    }

    #[test]
    fn description_capped_at_120() {
        let content = format!("## A\n> {}\n\nBody", "d".repeat(200));
        let meta = extract_metadata(&content);
        assert_eq!(meta.description.map(|d| d.chars().count()), Some(120));
    }

    #[test]
    fn inject_scope_only_when_not_always_applied() {
        let mut block = MetadataBlock {
            globs: Some("src/**".into()),
            ..Default::default()
        };
        assert_eq!(inject_metadata("## A\n\nBody", &block), "## A\n\nBody");
        block.always_apply = Some(true);
        assert_eq!(inject_metadata("## A\n\nBody", &block), "## A\n\nBody");
        block.always_apply = Some(false);
        assert_eq!(
            inject_metadata("## A\n\nBody", &block),
            "## A\n\n> [!globs] src/**\n\nBody"
        );
    }

    #[test]
    fn inject_empty_scope_and_kind() {
        let block = MetadataBlock {
            always_apply: Some(false),
            kind: SectionKind::Agent,
            ..Default::default()
        };
        assert_eq!(
            inject_metadata("## A\nBody", &block),
            "## A\n\n> [!globs]\n> [!type] agent\n\nBody"
        );
    }

    #[test]
    fn inject_without_heading_prepends() {
        let block = MetadataBlock {
            kind: SectionKind::Command,
            ..Default::default()
        };
        assert_eq!(
            inject_metadata("Body only", &block),
            "> [!type] command\n\nBody only"
        );
    }

    #[test]
    fn inject_then_extract_restores_content() {
        let content = "# Style\n\nUse rustfmt.\n\n## Naming\n\nsnake_case.";
        let block = MetadataBlock {
            description: Some("Formatting rules".into()),
            globs: Some("**/*.rs".into()),
            always_apply: Some(false),
            kind: SectionKind::Skill,
        };
        let injected = inject_metadata(content, &block);
        let meta = extract_metadata(&injected);
        assert_eq!(meta.content, content);
        assert_eq!(meta.description.as_deref(), Some("Formatting rules"));
        assert_eq!(meta.globs.as_deref(), Some("**/*.rs"));
        assert_eq!(meta.always_apply_flag(), Some(false));
        assert_eq!(meta.kind, Some(SectionKind::Skill));
    }

    #[test]
    fn callouts_only_keeps_leading_quote() {
        let content = "# A\n\n> [!globs] src/**\n\n> Warning: never force-push.\n\nBody";
        let meta = extract_callouts(content);
        assert_eq!(meta.description, None);
        assert_eq!(meta.globs.as_deref(), Some("src/**"));
        assert_eq!(meta.content, "# A\n\n> Warning: never force-push.\n\nBody");

        let quote_only = "# A\n\n> Warning.\n\nBody";
        assert_eq!(extract_callouts(quote_only).content, quote_only);
    }

    #[test]
    fn apply_to_section() {
        let mut section = Section::new("a", "old");
        section.description = "kept".into();
        extract_metadata("## A\n> [!type] command\nBody").apply_to(&mut section);
        assert_eq!(section.content, "## A\n\nBody");
        assert_eq!(section.description, "kept");
        assert_eq!(section.kind, SectionKind::Command);
        assert_eq!(section.always_apply, None);
    }
}
