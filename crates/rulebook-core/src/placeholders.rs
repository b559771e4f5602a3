//! `{{NAME}}` placeholder handling.
//!
//! - [`resolve`] substitutes a dialect's values and drops every line on which
//!   some token resolved to the empty string.
//! - [`placeholderize`] goes the other way, turning a tool's literal paths
//!   back into tokens.
//! - [`detect_dialect`] guesses which tool a piece of text was written for.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::dialect::{Dialect, PlaceholderTable, SIGNAL_NAMES};

/// Literal values shorter than this are never placeholderized or scored.
pub const MIN_LITERAL_LEN: usize = 4;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z][A-Z0-9_]*)\}\}").expect("valid token regex"));

/// Outcome of resolving placeholders in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved text.
    pub text: String,
    /// Number of known tokens that were substituted or elided.
    pub substituted: usize,
    /// Number of lines dropped because a token resolved to `""`.
    pub elided_lines: usize,
}

/// One variable substituted by [`placeholderize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Variable name.
    pub name: &'static str,
    /// Literal value that was replaced.
    pub value: &'static str,
    /// Number of occurrences replaced.
    pub count: usize,
}

/// Resolve `{{NAME}}` tokens for `dialect`.
///
/// Unknown names are left untouched. Works per physical line: when any token
/// on a line resolves to the empty string the whole line is dropped.
pub fn resolve(text: &str, dialect: Dialect) -> String {
    resolve_with(text, dialect.placeholders()).text
}

/// [`resolve`] against an explicit table, reporting counts.
pub fn resolve_with(text: &str, table: &PlaceholderTable) -> Resolution {
    let mut substituted = 0usize;
    let mut elided_lines = 0usize;
    let mut kept: Vec<String> = Vec::new();

    for line in text.split('\n') {
        if !line.contains("{{") {
            kept.push(line.to_string());
            continue;
        }

        let mut elide = false;
        let resolved = TOKEN_RE.replace_all(line, |caps: &Captures<'_>| match table.get(&caps[1]) {
            Some(value) => {
                substituted += 1;
                if value.is_empty() {
                    elide = true;
                }
                value.to_string()
            }
            None => caps[0].to_string(),
        });

        if elide {
            elided_lines += 1;
        } else {
            kept.push(resolved.into_owned());
        }
    }

    Resolution {
        text: kept.join("\n"),
        substituted,
        elided_lines,
    }
}

/// Count known placeholder tokens in `text`.
pub fn count_placeholders(text: &str) -> usize {
    TOKEN_RE
        .captures_iter(text)
        .filter(|caps| Dialect::Claude.placeholders().get(&caps[1]).is_some())
        .count()
}

/// Replace `dialect`'s literal values in `text` with `{{NAME}}` tokens.
///
/// Values are tried longest first so a short value never eats part of a
/// longer one containing it. Values shorter than [`MIN_LITERAL_LEN`] are
/// skipped.
pub fn placeholderize(text: &str, dialect: Dialect) -> (String, Vec<Replacement>) {
    let mut entries: Vec<(&'static str, &'static str)> = dialect
        .placeholders()
        .entries()
        .into_iter()
        .filter(|(_, value)| value.chars().count() >= MIN_LITERAL_LEN)
        .collect();
    entries.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

    let mut current = text.to_string();
    let mut replacements = Vec::new();

    for (name, value) in entries {
        let Ok(pattern) = Regex::new(&regex::escape(value)) else {
            continue;
        };
        let count = pattern.find_iter(&current).count();
        if count == 0 {
            continue;
        }
        let token = format!("{{{{{name}}}}}");
        current = pattern
            .replace_all(&current, regex::NoExpand(&token))
            .into_owned();
        debug!(name, count, "placeholderized literal");
        replacements.push(Replacement { name, value, count });
    }

    (current, replacements)
}

/// Guess which dialect `text` was written for.
///
/// Scores each dialect by summing the lengths of its signal values found
/// verbatim in the text. Returns `None` when nothing of at least
/// [`MIN_LITERAL_LEN`] characters matches. Ties go to the earlier dialect in
/// [`Dialect::ALL`].
pub fn detect_dialect(text: &str) -> Option<Dialect> {
    let mut best: Option<(Dialect, usize)> = None;

    for dialect in Dialect::ALL {
        let table = dialect.placeholders();
        let score: usize = SIGNAL_NAMES
            .iter()
            .filter_map(|name| table.get(name))
            .filter(|value| value.chars().count() >= MIN_LITERAL_LEN && text.contains(*value))
            .map(str::len)
            .sum();

        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((dialect, score));
        }
    }

    best.map(|(dialect, _)| dialect)
}
