//! Slug and description derivation.

use crate::lines::{LineKind, tokenize};

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 120;

/// Derive a filename-safe slug from heading text.
///
/// Lower-cases, drops everything that is not alphanumeric, whitespace or a
/// hyphen, turns whitespace runs into single hyphens, collapses repeated
/// hyphens and trims hyphens from both ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
    }

    slug
}

/// Whether `name` is a valid slug (`a-z0-9` words joined by single hyphens).
pub fn is_slug(name: &str) -> bool {
    !name.is_empty()
        && name.split('-').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

/// Truncate a description to [`MAX_DESCRIPTION_CHARS`] characters.
pub fn truncate_description(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_DESCRIPTION_CHARS) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}

/// Derive a description from section content.
///
/// Takes the first non-blank, non-heading line outside code fences. Callout
/// lines are metadata and are skipped; a blockquote contributes its quoted
/// text. When the candidate looks like a table row or a list item the
/// description is empty rather than a guess.
pub fn derive_description(content: &str) -> String {
    for line in tokenize(content) {
        if line.fenced {
            continue;
        }
        match line.kind {
            LineKind::Blank | LineKind::Heading { .. } | LineKind::Callout { .. } => {}
            LineKind::Blockquote { text } if text.is_empty() => {}
            LineKind::Blockquote { text } => return truncate_description(text),
            LineKind::Plain { text } => {
                let text = text.trim();
                if looks_structured(text) {
                    return String::new();
                }
                return truncate_description(text);
            }
            LineKind::Fence => {}
        }
    }
    String::new()
}

/// Table rows and list items make poor descriptions.
fn looks_structured(line: &str) -> bool {
    if line.starts_with(['|', '-', '*', '+']) {
        return true;
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with('.')
}
