//! Heading-based segmentation.
//!
//! A level-two heading outside a code fence opens a section; deeper headings
//! stay attached to the open section. Anything before the first section is the
//! preamble, kept only when it carries prose.

use tracing::debug;

use crate::headings::{SECTION_LEVEL, strip_first_heading_ordinal, strip_ordinal};
use crate::lines::{Line, LineKind, join_trimmed, tokenize};
use crate::metadata::extract_metadata;
use crate::slug::{derive_description, slugify};
use crate::types::{Document, PREAMBLE_NAME, Section};

/// A section as written in the source, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection<'a> {
    /// Heading text exactly as written after the marker.
    pub heading: &'a str,
    /// Heading line and body lines, verbatim.
    pub lines: Vec<&'a str>,
}

impl RawSection<'_> {
    /// Verbatim content with trailing blank lines dropped.
    pub fn content(&self) -> String {
        join_trimmed(&self.lines)
    }
}

/// Source text split on section boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSplit<'a> {
    /// Lines before the first section heading.
    pub preamble: Vec<&'a str>,
    /// Sections in document order.
    pub sections: Vec<RawSection<'a>>,
}

impl RawSplit<'_> {
    /// Preamble content, if it carries at least one prose line.
    pub fn preamble_content(&self) -> Option<String> {
        let meaningful = tokenize(&self.preamble.join("\n"))
            .iter()
            .any(|line| is_prose(line));
        if !meaningful {
            return None;
        }
        let start = self
            .preamble
            .iter()
            .position(|l| !l.trim().is_empty())
            .unwrap_or(0);
        Some(join_trimmed(&self.preamble[start..]))
    }
}

fn is_prose(line: &Line<'_>) -> bool {
    !matches!(line.kind, LineKind::Blank | LineKind::Heading { .. })
}

/// Split `text` on section headings without touching any line.
pub fn split(text: &str) -> RawSplit<'_> {
    let mut split = RawSplit::default();
    if text.is_empty() {
        return split;
    }

    for line in tokenize(text) {
        match line.heading() {
            Some((SECTION_LEVEL, heading)) => split.sections.push(RawSection {
                heading,
                lines: vec![line.raw],
            }),
            _ => match split.sections.last_mut() {
                Some(section) => section.lines.push(line.raw),
                None => split.preamble.push(line.raw),
            },
        }
    }

    split
}

/// Split a document into a preamble and sections.
///
/// Each section's heading loses any leading ordinal; the ordinal never
/// carries meaning. Names are slugs of the heading text, falling back to
/// `section-N` when the heading has no slug-able characters.
pub fn segment(text: &str) -> Document {
    let raw = split(text);

    let preamble = raw.preamble_content().map(|content| {
        let mut section = Section::new(PREAMBLE_NAME, content);
        section.description = derive_description(&section.content);
        section
    });

    let sections: Vec<Section> = raw
        .sections
        .iter()
        .enumerate()
        .map(|(i, raw_section)| section_from_raw(i + 1, raw_section))
        .collect();

    debug!(
        sections = sections.len(),
        preamble = preamble.is_some(),
        "segmented document"
    );

    Document { preamble, sections }
}

fn section_from_raw(position: usize, raw: &RawSection<'_>) -> Section {
    let title = strip_ordinal(raw.heading);
    let mut name = slugify(title);
    if name.is_empty() {
        name = format!("section-{position}");
    }
    let content = strip_first_heading_ordinal(&raw.content());
    let description = extract_metadata(&content)
        .description
        .unwrap_or_else(|| derive_description(&content));
    let mut section = Section::new(name, content);
    section.description = description;
    section
}
