#![allow(missing_docs, unused_results)]

use std::collections::HashMap;

use assert_matches::assert_matches;
use rulebook_core::compose::{ComposeOptions, compose};
use rulebook_core::decompose::{DecomposeOptions, decompose};
use rulebook_core::headings::number_sections;
use rulebook_core::links::{hash_to_relative, relative_to_hash};
use rulebook_core::metadata::inject_section_metadata;
use rulebook_core::placeholders::resolve;
use rulebook_core::reconstruct::{Grouping, ReconstructionWarning, reconstruct};
use rulebook_core::slug::derive_description;
use rulebook_core::{Dialect, Section, SectionKind};

fn rule_sections(dialect: Dialect) -> Vec<Section> {
    let ext = dialect.rules_extension();

    let setup = Section::new(
        "setup",
        format!("# Setup\n\nInstall deps.\n\nSee [testing](./02-testing.{ext})."),
    );

    let mut testing = Section::new(
        "testing",
        "# Testing\n\nRun tests.\n\n## Unit\n\nFast.\n\n```sh\n## not a heading\n```",
    );
    testing.globs = Some("tests/**, src/**/*.rs".into());
    testing.always_apply = Some(false);

    let mut review = Section::new("review", "# Review\n\nCheck the diff.");
    review.kind = SectionKind::Skill;

    vec![setup, testing, review]
}

#[test]
fn compose_then_decompose_preserves_sections() {
    for dialect in Dialect::ALL {
        let original = rule_sections(dialect);
        let composed = compose(&original, dialect, &ComposeOptions::default());
        let split = decompose(&composed.text, dialect, DecomposeOptions::default());

        assert_eq!(split.sections.len(), original.len(), "{dialect}");
        for (before, after) in original.iter().zip(&split.sections) {
            assert_eq!(after.content, before.content, "{dialect}: {}", before.name);
            assert_eq!(after.name, before.name, "{dialect}");
            assert_eq!(after.kind, before.kind, "{dialect}");
            assert_eq!(after.is_always_applied(), before.is_always_applied(), "{dialect}");
            if !before.is_always_applied() {
                assert_eq!(after.globs, before.globs, "{dialect}");
            }
        }
    }
}

#[test]
fn rule_files_compose_back_to_the_same_document() {
    for dialect in Dialect::ALL {
        let composed = compose(&rule_sections(dialect), dialect, &ComposeOptions::default());
        let split = decompose(&composed.text, dialect, DecomposeOptions::default());

        let reread: Vec<Section> = split
            .files
            .iter()
            .zip(&split.sections)
            .map(|(file, section)| {
                Section::from_rule_file(section.name.clone(), file.directory.clone(), file.kind, &file.contents)
            })
            .collect();

        for (parsed, section) in reread.iter().zip(&split.sections) {
            assert_eq!(parsed.content, section.content, "{dialect}");
            assert_eq!(parsed.description, section.description, "{dialect}");
        }

        let again = compose(&reread, dialect, &ComposeOptions::default());
        assert_eq!(again.text, composed.text, "{dialect}");
    }
}

#[test]
fn composed_document_shape() {
    let composed = compose(&rule_sections(Dialect::Cursor), Dialect::Cursor, &ComposeOptions::default());
    assert_eq!(
        composed.text,
        "## 1. Setup\n\nInstall deps.\n\nSee [testing](#2-testing).\n\n\
         ## 2. Testing\n\n> [!globs] tests/**, src/**/*.rs\n\nRun tests.\n\n### Unit\n\nFast.\n\n```sh\n## not a heading\n```\n\n\
         ## 3. Review\n\n> [!type] skill\n\nCheck the diff.\n"
    );
}

#[test]
fn numbering_is_positional_and_idempotent() {
    let text = "## A\n\n## B\n\n## C\n\n## D\n\n## 99. Rule Name\n";
    let once = number_sections(text);
    assert!(once.contains("## 5. Rule Name"));
    assert_eq!(number_sections(&once), once);
}

#[test]
fn placeholder_lines_elide_without_skills() {
    let text = "Rules: {{RULES_DIR}}\nSkills: {{SKILLS_DIR}}\nStatic line";
    for dialect in [Dialect::Cursor, Dialect::Windsurf, Dialect::Copilot] {
        let expected = format!("Rules: {}\nStatic line", dialect.placeholders().rules_dir);
        assert_eq!(resolve(text, dialect), expected, "{dialect}");
    }
}

#[test]
fn link_round_trip() {
    let to_position: HashMap<String, usize> = [("06-rules-and-skills".to_string(), 6)].into();
    let hashed = relative_to_hash("[X](./06-rules-and-skills.mdc)", &to_position);
    assert_eq!(hashed, "[X](#6-rules-and-skills)");

    let to_filename: HashMap<usize, String> = [(6, "06-rules-and-skills.mdc".to_string())].into();
    assert_eq!(hash_to_relative(&hashed, &to_filename, ""), "[X](./06-rules-and-skills.mdc)");
}

#[test]
fn single_grouping_leaves_four_unclaimed() {
    let source = "## One\n\na\n\n## Two\n\nb\n\n## Three\n\nc\n\n## Four\n\nd\n\n## Five\n\ne\n";
    let groupings = vec![Grouping {
        name: "one".into(),
        description: "The first rule".into(),
        headings: vec!["One".into()],
        directory: None,
        kind: None,
    }];

    let result = reconstruct(source, &groupings);
    assert_eq!(result.sections.len(), 1);
    assert!(result.unclaimed() >= 4);
    assert_eq!(result.unmatched(), 0);
    assert_matches!(
        &result.warnings[0],
        ReconstructionWarning::UnclaimedSection { heading } if heading == "Two"
    );
}

#[test]
fn always_applied_sections_get_no_scope_callout() {
    for flag in [None, Some(true)] {
        let mut section = Section::new("style", "# Style\n\nFormat.");
        section.globs = Some("src/**".into());
        section.always_apply = flag;
        assert_eq!(inject_section_metadata(&section, false), "# Style\n\nFormat.");
    }
}

#[test]
fn long_descriptions_truncate_to_120() {
    let content = format!("## Long\n\n{}", "a".repeat(200));
    assert_eq!(derive_description(&content).chars().count(), 120);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn title() -> impl Strategy<Value = String> {
        proptest::collection::vec("[A-Z][a-z]{2,8}", 1..4).prop_map(|words| words.join(" "))
    }

    fn body() -> impl Strategy<Value = String> {
        proptest::collection::vec("[a-z][a-z ]{0,30}", 1..4).prop_map(|lines| lines.join("\n"))
    }

    proptest! {
        #[test]
        fn content_survives_round_trip(
            parts in proptest::collection::vec((title(), body()), 1..6),
            dialect_index in 0usize..5,
        ) {
            let dialect = Dialect::ALL[dialect_index];
            let sections: Vec<Section> = parts
                .iter()
                .enumerate()
                .map(|(i, (title, body))| Section::new(format!("s{i}"), format!("# {title}\n\n{body}")))
                .collect();

            let composed = compose(&sections, dialect, &ComposeOptions::default());
            let split = decompose(&composed.text, dialect, DecomposeOptions::default());

            prop_assert_eq!(split.sections.len(), sections.len());
            for (before, after) in sections.iter().zip(&split.sections) {
                prop_assert_eq!(&after.content, &before.content);
            }
        }
    }
}
