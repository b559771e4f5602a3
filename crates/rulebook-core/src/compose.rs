//! Rule files → one monolithic document for a target dialect.

use tracing::{debug, info};

use crate::dialect::Dialect;
use crate::frontmatter::parse_rule_file;
use crate::headings::{demote_headings, number_sections};
use crate::lines::heading_line;
use crate::links::{SectionIndex, relative_to_hash};
use crate::metadata::inject_section_metadata;
use crate::placeholders::{count_placeholders, resolve};
use crate::slug::truncate_description;
use crate::types::{Section, SectionKind};

/// Toggles for [`compose`]. Every step is on by default except description
/// injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Strip `---` frontmatter from section bodies, adopting its metadata.
    pub strip_frontmatter: bool,
    /// Resolve `{{NAME}}` tokens for the target dialect.
    pub resolve_placeholders: bool,
    /// Rewrite relative rule-file links into hash anchors.
    pub resolve_links: bool,
    /// Push every heading one level deeper in sections titled at level 1.
    pub shift_headings: bool,
    /// Re-inject scope and kind callouts.
    pub inject_metadata: bool,
    /// Renumber section headings by position.
    pub number_sections: bool,
    /// Also inject description blockquotes.
    pub inject_descriptions: bool,
    /// Optional `# Title` line opening the document.
    pub title: Option<String>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            strip_frontmatter: true,
            resolve_placeholders: true,
            resolve_links: true,
            shift_headings: true,
            inject_metadata: true,
            number_sections: true,
            inject_descriptions: false,
            title: None,
        }
    }
}

/// A composed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// Document text, ending in a single newline.
    pub text: String,
    /// Known placeholder tokens found before resolution.
    pub placeholder_count: usize,
}

/// Join `sections` into one document for `dialect`.
///
/// A section named `preamble` is placed first and is never shifted,
/// annotated or numbered. The others keep their order; position `N` is the
/// `N`th non-preamble section.
pub fn compose(sections: &[Section], dialect: Dialect, options: &ComposeOptions) -> Composition {
    let (preambles, body): (Vec<&Section>, Vec<&Section>) =
        sections.iter().partition(|s| s.is_preamble());
    let index = SectionIndex::from_names(body.iter().map(|s| s.name.as_str()));

    let mut placeholder_count = 0usize;
    let mut parts: Vec<String> = Vec::with_capacity(sections.len() + 1);

    if let Some(title) = options.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        parts.push(heading_line(1, title));
    }

    for preamble in preambles {
        let section = adopt_frontmatter(preamble, options);
        let mut content = section.content;
        if options.resolve_links {
            content = relative_to_hash(&content, index.stem_to_position());
        }
        placeholder_count += count_placeholders(&content);
        if options.resolve_placeholders {
            content = resolve(&content, dialect);
        }
        parts.push(content);
    }

    for original in body {
        let section = adopt_frontmatter(original, options);
        let mut content = if options.inject_metadata {
            inject_section_metadata(&section, options.inject_descriptions)
        } else {
            section.content.clone()
        };
        if options.resolve_links {
            content = relative_to_hash(&content, index.stem_to_position());
        }
        placeholder_count += count_placeholders(&content);
        if options.resolve_placeholders {
            content = resolve(&content, dialect);
        }
        if options.shift_headings {
            content = demote_headings(&content);
        }
        debug!(section = %section.name, "composed section");
        parts.push(content);
    }

    let mut text = parts
        .iter()
        .map(|p| p.trim_matches('\n'))
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    if options.number_sections {
        text = number_sections(&text);
    }
    text.push('\n');

    info!(
        dialect = %dialect,
        sections = sections.len(),
        placeholders = placeholder_count,
        "composed document"
    );

    Composition {
        text,
        placeholder_count,
    }
}

/// Strip frontmatter from a section body, filling unset fields from it.
fn adopt_frontmatter(section: &Section, options: &ComposeOptions) -> Section {
    let mut section = section.clone();
    if !options.strip_frontmatter {
        return section;
    }
    let parsed = parse_rule_file(&section.content);
    if !parsed.has_frontmatter {
        return section;
    }

    let fm = &parsed.frontmatter;
    if section.globs.is_none() {
        section.globs = fm.scope();
    }
    if section.always_apply.is_none() {
        section.always_apply = fm.apply_flag();
    }
    if section.description.trim().is_empty() {
        if let Some(description) = fm.description() {
            section.description = truncate_description(description);
        }
    }
    if let Some(kind) = fm.kind.filter(|_| section.kind == SectionKind::Rule) {
        section.kind = kind;
    }
    section.content = parsed
        .body
        .trim_start_matches(['\n', '\r'])
        .trim_end()
        .to_string();
    section
}
