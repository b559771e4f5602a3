//! Rebuilding sections from machine-proposed groupings.
//!
//! A grouping only *selects* headings of the source document. Content is
//! always copied from the source's [`HeadingMap`], never from the grouping
//! itself, so a wrong grouping can merge, reorder or omit sections but cannot
//! alter or invent prose. Every mismatch is reported as a
//! [`ReconstructionWarning`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::headings::{shift_headings, strip_first_heading_ordinal, strip_ordinal};
use crate::segment::split;
use crate::slug::{derive_description, is_slug, truncate_description};
use crate::types::{PREAMBLE_NAME, Section, SectionKind};

/// Reserved [`HeadingMap`] key of the preamble.
pub const PREAMBLE_KEY: &str = "__preamble__";

/// Minimum length of a grouping description.
pub const MIN_DESCRIPTION_CHARS: usize = 5;

/// One proposed output section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grouping {
    /// Slug of the output section.
    pub name: String,
    /// Description; always preferred over a derived one.
    pub description: String,
    /// Source headings to merge, in output order.
    pub headings: Vec<String>,
    /// Optional slug path to group the output file under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    /// Optional section kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SectionKind>,
}

/// Groupings that do not have the required shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaValidationError {
    /// The payload is not JSON.
    #[error("invalid JSON: {0}")]
    Json(String),

    /// The payload is neither an array nor an object with a `rules` array.
    #[error("expected an array of groupings or an object with a \"rules\" array")]
    NotAnArray,

    /// The array is empty.
    #[error("no groupings supplied")]
    Empty,

    /// An element could not be read as a grouping.
    #[error("grouping {index}: {message}")]
    InvalidGrouping {
        /// Zero-based element index.
        index: usize,
        /// Deserializer message.
        message: String,
    },

    /// `name` is not a slug.
    #[error("grouping {index}: name {name:?} must be a lowercase slug")]
    InvalidName {
        /// Zero-based element index.
        index: usize,
        /// Offending name.
        name: String,
    },

    /// `description` is too short.
    #[error("grouping {name:?}: description must be at least 5 characters")]
    DescriptionTooShort {
        /// Grouping name.
        name: String,
    },

    /// `headings` is empty.
    #[error("grouping {name:?}: headings must list at least one heading")]
    NoHeadings {
        /// Grouping name.
        name: String,
    },

    /// `directory` is not a slug path.
    #[error("grouping {name:?}: directory {directory:?} must be a slug path")]
    InvalidDirectory {
        /// Grouping name.
        name: String,
        /// Offending directory.
        directory: String,
    },
}

/// Parse and validate a grouping payload.
///
/// Accepts a top-level array or an object carrying a `rules` array.
pub fn parse_groupings(json: &str) -> Result<Vec<Grouping>, SchemaValidationError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| SchemaValidationError::Json(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("rules") {
            Some(Value::Array(items)) => items,
            _ => return Err(SchemaValidationError::NotAnArray),
        },
        _ => return Err(SchemaValidationError::NotAnArray),
    };

    let groupings = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Grouping>(item).map_err(|e| {
                SchemaValidationError::InvalidGrouping {
                    index,
                    message: e.to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    validate_groupings(&groupings)?;
    Ok(groupings)
}

/// Check groupings against the required shape.
pub fn validate_groupings(groupings: &[Grouping]) -> Result<(), SchemaValidationError> {
    if groupings.is_empty() {
        return Err(SchemaValidationError::Empty);
    }
    for (index, grouping) in groupings.iter().enumerate() {
        if !is_slug(&grouping.name) {
            return Err(SchemaValidationError::InvalidName {
                index,
                name: grouping.name.clone(),
            });
        }
        if grouping.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(SchemaValidationError::DescriptionTooShort {
                name: grouping.name.clone(),
            });
        }
        if grouping.headings.iter().all(|h| h.trim().is_empty()) {
            return Err(SchemaValidationError::NoHeadings {
                name: grouping.name.clone(),
            });
        }
        if let Some(directory) = grouping.directory.as_deref() {
            let valid = directory
                .trim_matches('/')
                .split('/')
                .all(is_slug);
            if !valid {
                return Err(SchemaValidationError::InvalidDirectory {
                    name: grouping.name.clone(),
                    directory: directory.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// A non-fatal mismatch between groupings and the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconstructionWarning {
    /// A grouping referenced a heading the source does not have.
    UnmatchedHeading {
        /// Grouping name.
        rule: String,
        /// Reference as written in the grouping.
        heading: String,
    },
    /// A source heading no grouping referenced.
    UnclaimedSection {
        /// Heading text as written in the source.
        heading: String,
    },
}

impl fmt::Display for ReconstructionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedHeading { rule, heading } => {
                write!(f, "rule \"{rule}\" references unknown heading \"{heading}\"")
            }
            Self::UnclaimedSection { heading } => {
                write!(f, "section \"{heading}\" is not claimed by any rule")
            }
        }
    }
}

/// One source section keyed by its verbatim heading text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    /// Heading text as written (ordinals included).
    pub key: String,
    /// Verbatim content, heading line first.
    pub content: String,
}

/// Source sections in document order, keyed by exact heading text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingMap {
    entries: Vec<HeadingEntry>,
}

impl HeadingMap {
    /// Build the map from source text.
    ///
    /// A meaningful preamble is stored under [`PREAMBLE_KEY`].
    pub fn from_source(text: &str) -> Self {
        let raw = split(text);
        let mut entries = Vec::with_capacity(raw.sections.len() + 1);
        if let Some(content) = raw.preamble_content() {
            entries.push(HeadingEntry {
                key: PREAMBLE_KEY.to_string(),
                content,
            });
        }
        entries.extend(raw.sections.iter().map(|s| HeadingEntry {
            key: s.heading.to_string(),
            content: s.content(),
        }));
        Self { entries }
    }

    /// Entries in document order.
    pub fn entries(&self) -> &[HeadingEntry] {
        &self.entries
    }

    /// Content stored under an exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.content.as_str())
    }

    /// Preamble content, if any.
    pub fn preamble(&self) -> Option<&str> {
        self.get(PREAMBLE_KEY)
    }

    /// Number of entries, preamble included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry `reference` points at.
    ///
    /// Tries, in order: the exact text, the text without a leading `#`
    /// marker run, then ordinal-insensitive. Among several matches in one
    /// tier an unclaimed one wins.
    fn find(&self, reference: &str, claimed: &[bool]) -> Option<usize> {
        let exact = reference.trim();
        let unmarked = exact.trim_start_matches('#').trim();
        let bare = strip_ordinal(unmarked);

        let tiers: [&dyn Fn(&str) -> bool; 3] = [
            &|key: &str| key == exact,
            &|key: &str| key == unmarked,
            &|key: &str| strip_ordinal(key) == bare,
        ];

        for accept in tiers {
            let candidates: Vec<usize> = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.key != PREAMBLE_KEY && accept(&e.key))
                .map(|(i, _)| i)
                .collect();
            if let Some(&first) = candidates.first() {
                return Some(
                    candidates
                        .iter()
                        .copied()
                        .find(|&i| !claimed[i])
                        .unwrap_or(first),
                );
            }
        }
        None
    }
}

/// Sections rebuilt from groupings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconstruction {
    /// One section per grouping that resolved at least one heading.
    pub sections: Vec<Section>,
    /// Source preamble, passed through unchanged.
    pub preamble: Option<Section>,
    /// Mismatches, in discovery order.
    pub warnings: Vec<ReconstructionWarning>,
}

impl Reconstruction {
    /// Number of [`ReconstructionWarning::UnmatchedHeading`] warnings.
    pub fn unmatched(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ReconstructionWarning::UnmatchedHeading { .. }))
            .count()
    }

    /// Number of [`ReconstructionWarning::UnclaimedSection`] warnings.
    pub fn unclaimed(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ReconstructionWarning::UnclaimedSection { .. }))
            .count()
    }
}

/// Rebuild sections from `groupings`, copying content from `source`.
///
/// References to the preamble are accepted silently; it is always carried
/// through as [`Reconstruction::preamble`].
pub fn reconstruct(source: &str, groupings: &[Grouping]) -> Reconstruction {
    let map = HeadingMap::from_source(source);
    let mut claimed: Vec<bool> = map.entries().iter().map(|e| e.key == PREAMBLE_KEY).collect();
    let mut sections = Vec::new();
    let mut warnings = Vec::new();

    for grouping in groupings {
        let mut parts: Vec<&str> = Vec::new();
        for reference in &grouping.headings {
            if is_preamble_reference(reference) {
                continue;
            }
            match map.find(reference, &claimed) {
                Some(index) => {
                    claimed[index] = true;
                    parts.push(&map.entries()[index].content);
                }
                None => {
                    warn!(rule = %grouping.name, heading = %reference, "grouping references unknown heading");
                    warnings.push(ReconstructionWarning::UnmatchedHeading {
                        rule: grouping.name.clone(),
                        heading: reference.clone(),
                    });
                }
            }
        }

        if parts.is_empty() {
            debug!(rule = %grouping.name, "grouping resolved no headings");
            continue;
        }
        sections.push(section_from_grouping(grouping, &parts));
    }

    for (entry, was_claimed) in map.entries().iter().zip(&claimed) {
        if !was_claimed {
            warn!(heading = %entry.key, "source section not claimed by any grouping");
            warnings.push(ReconstructionWarning::UnclaimedSection {
                heading: entry.key.clone(),
            });
        }
    }

    let preamble = map.preamble().map(|content| {
        let mut section = Section::new(PREAMBLE_NAME, content);
        section.description = derive_description(content);
        section
    });

    Reconstruction {
        sections,
        preamble,
        warnings,
    }
}

fn is_preamble_reference(reference: &str) -> bool {
    let reference = reference.trim();
    reference == PREAMBLE_KEY || reference.eq_ignore_ascii_case(PREAMBLE_NAME)
}

/// Merge referenced parts: the first keeps its heading, later ones are
/// demoted one level beneath it.
fn section_from_grouping(grouping: &Grouping, parts: &[&str]) -> Section {
    let mut merged = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            merged.push(strip_first_heading_ordinal(part));
        } else {
            merged.push(shift_headings(part, 1));
        }
    }

    let mut section = Section::new(grouping.name.clone(), merged.join("\n\n"));
    section.description = truncate_description(&grouping.description);
    section.directory = grouping
        .directory
        .as_deref()
        .map(|d| d.trim_matches('/').to_string())
        .filter(|d| !d.is_empty());
    section.kind = grouping.kind.unwrap_or_default();
    section
}
