//! Reading and writing the canonical rule layout.
//!
//! ```text
//! <root>/
//!   rules/00-preamble.mdc
//!   rules/01-setup.mdc
//!   rules/backend/02-api.mdc
//!   skills/03-review.mdc
//! ```
//!
//! Directory names come from [`LayoutSettings`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rulebook_core::decompose::{Decomposition, RuleFile};
use rulebook_core::types::PREAMBLE_NAME;
use rulebook_core::{Section, SectionKind};
use rulebook_settings::LayoutSettings;
use tracing::debug;
use walkdir::WalkDir;

/// Extensions recognized as rule files.
const RULE_EXTENSIONS: [&str; 2] = ["md", "mdc"];

/// Write every file of `decomposition` below `root`.
///
/// Returns the written paths in write order. Existing files are overwritten;
/// nothing is deleted.
pub fn write_layout(
    root: &Path,
    decomposition: &Decomposition,
    layout: &LayoutSettings,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(decomposition.files.len() + 1);
    for file in decomposition.preamble.iter().chain(&decomposition.files) {
        let path = root.join(file.path_under(layout.dir_for(file.kind)));
        write_file(&path, file)?;
        written.push(path);
    }
    Ok(written)
}

fn write_file(path: &Path, file: &RuleFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, &file.contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "wrote rule file");
    Ok(())
}

/// Read sections from the layout below `root`.
///
/// Files of every kind are ordered together by filename, so numbered files
/// keep their position across kinds and subdirectories. Equal filenames fall
/// back to [`SectionKind::ALL`] order, then to the full path.
pub fn read_layout(root: &Path, layout: &LayoutSettings) -> Result<Vec<Section>> {
    let mut found: Vec<(SectionKind, PathBuf, PathBuf)> = Vec::new();
    for kind in SectionKind::ALL {
        let kind_root = root.join(layout.dir_for(kind));
        if !kind_root.is_dir() {
            debug!(path = %kind_root.display(), "layout directory missing, skipping");
            continue;
        }
        let mut files = rule_files(&kind_root)?;
        files.sort();
        found.extend(files.into_iter().map(|path| (kind, kind_root.clone(), path)));
    }
    found.sort_by(|(_, _, a), (_, _, b)| a.file_name().cmp(&b.file_name()));

    let mut sections = Vec::with_capacity(found.len());
    for (kind, kind_root, path) in found {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let directory = path
            .parent()
            .and_then(|p| p.strip_prefix(&kind_root).ok())
            .map(|p| p.to_string_lossy().replace('\\', "/"));
        sections.push(Section::from_rule_file(section_name(stem), directory, kind, &raw));
    }
    debug!(count = sections.len(), root = %root.display(), "read layout");
    Ok(sections)
}

fn rule_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let is_rule = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| RULE_EXTENSIONS.contains(&e));
        if is_rule {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Section name for a file stem: the `NN-` position prefix is dropped.
fn section_name(stem: &str) -> String {
    let name = match stem.split_once('-') {
        Some((prefix, rest))
            if !prefix.is_empty() && !rest.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => stem,
    };
    if name == PREAMBLE_NAME {
        PREAMBLE_NAME.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulebook_core::Dialect;
    use rulebook_core::compose::{ComposeOptions, compose};
    use rulebook_core::decompose::{DecomposeOptions, decompose};

    const DOC: &str = "Read this first.\n\n\
        ## 1. Setup\n\nInstall deps.\n\n\
        ## 2. Testing\n\n> [!globs] tests/**\n\nRun tests.\n\n\
        ## 3. Review\n\n> [!type] skill\n\nCheck the diff.\n";

    #[test]
    fn strips_position_prefix() {
        assert_eq!(section_name("01-setup"), "setup");
        assert_eq!(section_name("00-preamble"), "preamble");
        assert_eq!(section_name("setup"), "setup");
        assert_eq!(section_name("api-v2"), "api-v2");
        assert_eq!(section_name("2024-"), "2024-");
    }

    #[test]
    fn writes_kind_directories() {
        let dir = tempfile::tempdir().unwrap();
        let split = decompose(DOC, Dialect::Cursor, DecomposeOptions::default());
        let written = write_layout(dir.path(), &split, &LayoutSettings::default()).unwrap();

        assert_eq!(written.len(), 4);
        assert!(dir.path().join("rules/00-preamble.mdc").is_file());
        assert!(dir.path().join("rules/01-setup.mdc").is_file());
        assert!(dir.path().join("rules/02-testing.mdc").is_file());
        assert!(dir.path().join("skills/03-review.mdc").is_file());
    }

    #[test]
    fn custom_layout_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = LayoutSettings {
            skills_dir: "playbooks".into(),
            ..LayoutSettings::default()
        };
        let split = decompose(DOC, Dialect::Claude, DecomposeOptions::default());
        let _ = write_layout(dir.path(), &split, &layout).unwrap();
        assert!(dir.path().join("playbooks/03-review.md").is_file());

        let sections = read_layout(dir.path(), &layout).unwrap();
        assert_eq!(sections.last().map(|s| s.kind), Some(SectionKind::Skill));
    }

    #[test]
    fn read_back_matches_decomposed_sections() {
        let dir = tempfile::tempdir().unwrap();
        let split = decompose(DOC, Dialect::Cursor, DecomposeOptions::default());
        let _ = write_layout(dir.path(), &split, &LayoutSettings::default()).unwrap();

        let sections = read_layout(dir.path(), &LayoutSettings::default()).unwrap();
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["preamble", "setup", "testing", "review"]);
        assert!(sections[0].is_preamble());
        assert_eq!(sections[2].globs.as_deref(), Some("tests/**"));
        assert_eq!(sections[3].kind, SectionKind::Skill);
        for (read, original) in sections[1..].iter().zip(&split.sections) {
            assert_eq!(read.content, original.content);
        }

        let composed = compose(&sections, Dialect::Cursor, &ComposeOptions::default());
        assert!(composed.text.starts_with("Read this first.\n\n## 1. Setup"));
        assert!(composed.text.contains("## 3. Review"));
    }

    #[test]
    fn interleaved_kinds_keep_source_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = "## Setup\n\nInstall.\n\n## Review\n> [!type] skill\n\nCheck the diff.\n\n## Style\n\nFormat.\n";
        let split = decompose(source, Dialect::Claude, DecomposeOptions::default());
        let _ = write_layout(dir.path(), &split, &LayoutSettings::default()).unwrap();
        assert!(dir.path().join("skills/02-review.md").is_file());

        let sections = read_layout(dir.path(), &LayoutSettings::default()).unwrap();
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["setup", "review", "style"]);
        assert_eq!(sections[1].kind, SectionKind::Skill);

        let composed = compose(&sections, Dialect::Claude, &ComposeOptions::default());
        assert_eq!(
            composed.text,
            "## 1. Setup\n\nInstall.\n\n## 2. Review\n\n> [!type] skill\n\nCheck the diff.\n\n## 3. Style\n\nFormat.\n"
        );
    }

    #[test]
    fn subdirectories_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let rules = dir.path().join("rules");
        std::fs::create_dir_all(rules.join("backend")).unwrap();
        std::fs::write(rules.join("01-setup.md"), "# Setup\n\nInstall.\n").unwrap();
        std::fs::write(rules.join("backend/02-api.md"), "# API\n\nVersioned.\n").unwrap();
        std::fs::write(rules.join("03-style.md"), "# Style\n\nFormat.\n").unwrap();
        std::fs::write(rules.join("notes.txt"), "ignored").unwrap();

        let sections = read_layout(dir.path(), &LayoutSettings::default()).unwrap();
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["setup", "api", "style"]);
        assert_eq!(sections[1].directory.as_deref(), Some("backend"));
        assert_eq!(sections[0].directory, None);
    }

    #[test]
    fn missing_root_reads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sections = read_layout(&dir.path().join("absent"), &LayoutSettings::default()).unwrap();
        assert!(sections.is_empty());
    }
}
