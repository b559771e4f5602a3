//! Line tokenizer.
//!
//! Classifies every physical line of a markdown document into a closed set of
//! [`LineKind`]s. The rest of the crate reasons about documents only at line
//! and heading granularity, always through this tokenizer, so a heading marker
//! inside a fenced code block never opens a section and a callout inside a
//! code sample is never mistaken for metadata.

use std::sync::LazyLock;

use regex::Regex;

/// Deepest heading level markdown supports.
pub const MAX_HEADING_LEVEL: usize = 6;

static CALLOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^>\s*\[!([A-Za-z][A-Za-z0-9_-]*)\]\s*(.*?)\s*$").expect("valid callout regex")
});

/// What a single line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `#`..`######` followed by a space and non-empty text.
    Heading {
        /// Number of `#` markers.
        level: usize,
        /// Heading text, trimmed.
        text: &'a str,
    },
    /// Single-line annotation `> [!kind] args`.
    Callout {
        /// Callout kind as written.
        kind: &'a str,
        /// Everything after the kind marker, trimmed.
        args: &'a str,
    },
    /// Any other `>`-prefixed line.
    Blockquote {
        /// Quoted text with the marker stripped.
        text: &'a str,
    },
    /// Opening or closing code fence.
    Fence,
    /// Ordinary content (including every line inside a code fence).
    Plain {
        /// Line text without trailing carriage return.
        text: &'a str,
    },
    /// Empty or whitespace-only line.
    Blank,
}

/// A classified line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line exactly as it appeared (without the `\n`).
    pub raw: &'a str,
    /// Classification.
    pub kind: LineKind<'a>,
    /// Whether the line is a fence delimiter or sits inside a fenced block.
    pub fenced: bool,
}

impl<'a> Line<'a> {
    /// Heading level and text, if this line is a heading.
    pub fn heading(&self) -> Option<(usize, &'a str)> {
        match self.kind {
            LineKind::Heading { level, text } => Some((level, text)),
            _ => None,
        }
    }

    /// Whether this line is blank.
    pub fn is_blank(&self) -> bool {
        matches!(self.kind, LineKind::Blank)
    }
}

/// Split `text` on `\n` and classify each line.
///
/// A trailing newline yields a final [`LineKind::Blank`] entry, so joining the
/// `raw` fields with `\n` reproduces the input exactly.
pub fn tokenize(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut open_fence: Option<char> = None;

    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if let Some(marker) = fence_marker(line) {
            match open_fence {
                None => open_fence = Some(marker),
                Some(open) if open == marker => open_fence = None,
                Some(_) => {}
            }
            lines.push(Line {
                raw,
                kind: LineKind::Fence,
                fenced: true,
            });
            continue;
        }

        if open_fence.is_some() {
            lines.push(Line {
                raw,
                kind: LineKind::Plain { text: line },
                fenced: true,
            });
            continue;
        }

        lines.push(Line {
            raw,
            kind: classify(line),
            fenced: false,
        });
    }

    lines
}

/// Classify a single line outside of any code fence.
pub fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }

    if let Some((level, text)) = parse_heading(line) {
        return LineKind::Heading { level, text };
    }

    if line.starts_with('>') {
        if let Some(caps) = CALLOUT_RE.captures(line) {
            if let (Some(kind), Some(args)) = (caps.get(1), caps.get(2)) {
                return LineKind::Callout {
                    kind: kind.as_str(),
                    args: args.as_str(),
                };
            }
        }
        let text = line[1..].trim();
        return LineKind::Blockquote { text };
    }

    LineKind::Plain { text: line }
}

/// Parse `## Text` into `(2, "Text")`.
///
/// The marker run must be followed by a space and non-empty text; `##Text`
/// and a bare `##` are not headings.
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > MAX_HEADING_LEVEL {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    Some((level, text))
}

/// Render a heading line.
pub fn heading_line(level: usize, text: &str) -> String {
    format!("{} {text}", "#".repeat(level.clamp(1, MAX_HEADING_LEVEL)))
}

fn fence_marker(line: &str) -> Option<char> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some('`')
    } else if trimmed.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}

/// Join raw lines with `\n`, dropping trailing blank lines.
pub fn join_trimmed(lines: &[&str]) -> String {
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}
