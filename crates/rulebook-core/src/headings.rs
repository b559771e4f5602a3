//! Heading depth and numbering passes.
//!
//! Depth is a presentation detail: rule files carry a single `# Title`, the
//! composed document carries `## N. Title`. These passes move between the two
//! without touching anything but heading lines outside code fences.

use std::sync::LazyLock;

use regex::Regex;

use crate::lines::{LineKind, heading_line, tokenize};

/// Heading level that opens a section in a composed document.
pub const SECTION_LEVEL: usize = 2;

static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("valid ordinal regex"));

/// Strip a leading `N. ` ordinal from heading text.
///
/// `"5. Testing"` becomes `"Testing"`; `"2024 plans"` is left alone.
pub fn strip_ordinal(text: &str) -> &str {
    match ORDINAL_RE.find(text) {
        Some(m) if m.end() < text.len() => &text[m.end()..],
        _ => text,
    }
}

/// Whether heading text begins with an `N. ` ordinal.
pub fn has_ordinal(text: &str) -> bool {
    strip_ordinal(text).len() != text.len()
}

/// Add `delta` to every heading level, clamped to `1..=6`.
pub fn shift_headings(text: &str, delta: i32) -> String {
    if delta == 0 {
        return text.to_string();
    }
    rewrite_headings(text, |level, heading| {
        let shifted = i32::try_from(level).unwrap_or(i32::MAX).saturating_add(delta);
        let shifted = usize::try_from(shifted.max(1)).unwrap_or(1);
        Some(heading_line(shifted, heading))
    })
}

/// Level of the first heading outside code fences.
pub fn first_heading_level(text: &str) -> Option<usize> {
    tokenize(text).iter().find_map(|l| l.heading().map(|(level, _)| level))
}

/// Promote every heading one level for a rule file.
///
/// Content that already holds a level-1 heading is returned unchanged:
/// promoting it would fold that heading into its neighbours.
pub fn promote_headings(text: &str) -> String {
    let clamps = tokenize(text)
        .iter()
        .any(|l| l.heading().is_some_and(|(level, _)| level == 1));
    if clamps {
        return text.to_string();
    }
    shift_headings(text, -1)
}

/// Demote a rule file's headings so its title lands at [`SECTION_LEVEL`].
///
/// Only content titled at level 1 is shifted; a file whose first heading is
/// already at section depth or deeper was never promoted.
pub fn demote_headings(text: &str) -> String {
    match first_heading_level(text) {
        Some(level) if level < SECTION_LEVEL => shift_headings(text, 1),
        _ => text.to_string(),
    }
}

/// Renumber every section-level heading sequentially by position.
///
/// Whatever numeral a heading carried is discarded, so the fifth section
/// titled `"99. Foo"` becomes `"## 5. Foo"`. Applying the pass twice is the
/// same as applying it once.
pub fn number_sections(text: &str) -> String {
    let mut position = 0usize;
    rewrite_headings(text, |level, heading| {
        if level != SECTION_LEVEL {
            return None;
        }
        position += 1;
        Some(heading_line(
            SECTION_LEVEL,
            &format!("{position}. {}", strip_ordinal(heading)),
        ))
    })
}

/// Drop a leading ordinal from the first heading line of `content`.
pub fn strip_first_heading_ordinal(content: &str) -> String {
    let mut done = false;
    rewrite_headings(content, |level, heading| {
        if done {
            return None;
        }
        done = true;
        has_ordinal(heading).then(|| heading_line(level, strip_ordinal(heading)))
    })
}

/// Apply `rewrite` to each heading outside code fences.
///
/// Returning `None` keeps the original line byte-for-byte.
fn rewrite_headings<F>(text: &str, mut rewrite: F) -> String
where
    F: FnMut(usize, &str) -> Option<String>,
{
    let lines = tokenize(text);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let replaced = match line.kind {
            LineKind::Heading { level, text } => rewrite(level, text),
            _ => None,
        };
        out.push(replaced.unwrap_or_else(|| line.raw.to_string()));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_ordinals() {
        assert_eq!(strip_ordinal("5. Testing"), "Testing");
        assert_eq!(strip_ordinal("12.  Many spaces"), "Many spaces");
        assert_eq!(strip_ordinal("2024 plans"), "2024 plans");
        assert_eq!(strip_ordinal("1.5 release"), "1.5 release");
        assert_eq!(strip_ordinal("Plain"), "Plain");
    }

    #[test]
    fn shift_increments_and_caps() {
        let text = "# A\n\n## B\n\n###### F";
        assert_eq!(shift_headings(text, 1), "## A\n\n### B\n\n###### F");
    }

    #[test]
    fn promotion_skips_content_with_top_level_headings() {
        assert_eq!(promote_headings("## A\n\n### B"), "# A\n\n## B");
        let nested = "## A\n\ntext\n\n# Appendix\n\nmore";
        assert_eq!(promote_headings(nested), nested);
        assert_eq!(promote_headings("## A\n\n```\n# not a heading\n```"), "# A\n\n```\n# not a heading\n```");
    }

    #[test]
    fn demotion_only_moves_level_one_titles() {
        assert_eq!(demote_headings("# A\n\n## B"), "## A\n\n### B");
        let unpromoted = "## A\n\n# Appendix";
        assert_eq!(demote_headings(unpromoted), unpromoted);
        assert_eq!(demote_headings("No heading."), "No heading.");
        assert_eq!(first_heading_level("text\n### C\n# D"), Some(3));
    }

    #[test]
    fn shift_decrements_and_floors() {
        let text = "## A\n# B\ntext";
        assert_eq!(shift_headings(text, -1), "# A\n# B\ntext");
    }

    #[test]
    fn shift_skips_code_fences() {
        let text = "# A\n```\n# comment\n```";
        assert_eq!(shift_headings(text, 1), "## A\n```\n# comment\n```");
    }

    #[test]
    fn numbering_replaces_source_numerals() {
        let text = "## 1. A\n\n### Sub\n\n## B\n\n## C\n\n## D\n\n## 99. Rule Name";
        let numbered = number_sections(text);
        assert!(numbered.contains("## 1. A"));
        assert!(numbered.contains("### Sub"));
        assert!(numbered.contains("## 2. B"));
        assert!(numbered.ends_with("## 5. Rule Name"));
    }

    #[test]
    fn numbering_leaves_title_alone() {
        let text = "# Project\n\n## Setup\n";
        assert_eq!(number_sections(text), "# Project\n\n## 1. Setup\n");
    }

    #[test]
    fn strip_first_heading_only() {
        let text = "## 3. Style\n\n### 1. Details";
        assert_eq!(
            strip_first_heading_ordinal(text),
            "## Style\n\n### 1. Details"
        );
        assert_eq!(strip_first_heading_ordinal("## Style"), "## Style");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn numbering_is_idempotent(
                titles in proptest::collection::vec("[A-Za-z0-9 .]{1,20}", 0..8)
            ) {
                let text: String = titles
                    .iter()
                    .map(|t| format!("## {t}\n\nbody\n\n### sub\n"))
                    .collect();
                let once = number_sections(&text);
                let twice = number_sections(&once);
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn shift_round_trips_within_range(level in 1usize..6) {
                let text = format!("{} Heading\nbody", "#".repeat(level));
                let back = shift_headings(&shift_headings(&text, 1), -1);
                prop_assert_eq!(back, text);
            }
        }
    }
}
