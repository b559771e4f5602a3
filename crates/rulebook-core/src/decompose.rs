//! Monolithic document → rule files.

use serde::Serialize;
use tracing::{debug, info};

use crate::dialect::Dialect;
use crate::frontmatter::{FrontmatterFields, FrontmatterFlavor, with_frontmatter};
use crate::headings::promote_headings;
use crate::links::{SectionIndex, hash_to_relative, output_filenames, parent_dir};
use crate::metadata::{MetadataBlock, extract_metadata, inject_metadata};
use crate::segment::segment;
use crate::slug::derive_description;
use crate::types::{PREAMBLE_NAME, Section, SectionKind};

/// Toggles for [`decompose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecomposeOptions {
    /// Prefix filenames with a zero-padded position.
    pub numbered: bool,
    /// Rewrite `#N-slug` anchors into relative file links. Paths assume the
    /// default kind directories.
    pub resolve_links: bool,
    /// Promote headings one level so files carry a single `# Title`.
    /// Sections holding a level-1 heading keep their depth.
    pub promote_headings: bool,
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            numbered: true,
            resolve_links: true,
            promote_headings: true,
        }
    }
}

/// One rule file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFile {
    /// Kind, selecting the layout directory.
    pub kind: SectionKind,
    /// Optional grouping path below the kind directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    /// `[NN-]slug.ext`.
    pub filename: String,
    /// Full file contents, frontmatter included.
    pub contents: String,
}

impl RuleFile {
    /// Path relative to the layout root, given the kind's directory name.
    pub fn path_under(&self, kind_dir: &str) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if !kind_dir.is_empty() {
            parts.push(kind_dir);
        }
        if let Some(directory) = self.directory.as_deref() {
            parts.push(directory.trim_matches('/'));
        }
        parts.push(&self.filename);
        parts.join("/")
    }

    /// Path relative to the layout root using the default kind directories.
    pub fn relative_path(&self) -> String {
        self.path_under(self.kind.default_dir())
    }
}

/// Result of decomposing a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decomposition {
    /// Preamble file, if the document has meaningful preamble prose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preamble: Option<RuleFile>,
    /// Sections after metadata extraction, in position order.
    pub sections: Vec<Section>,
    /// One file per section, parallel to `sections`.
    pub files: Vec<RuleFile>,
}

/// Split `text` into rule files for `dialect`.
pub fn decompose(text: &str, dialect: Dialect, options: DecomposeOptions) -> Decomposition {
    let document = segment(text);
    decompose_sections(document.sections, document.preamble, dialect, options)
}

/// Render already-segmented (or reconstructed) sections into rule files.
///
/// A description already set on a section wins over one found in its
/// content; a description blockquote wins over a derived line.
pub fn decompose_sections(
    sections: Vec<Section>,
    preamble: Option<Section>,
    dialect: Dialect,
    options: DecomposeOptions,
) -> Decomposition {
    let extension = dialect.rules_extension();
    let mut sections = sections;
    for section in &mut sections {
        lift_metadata(section);
    }

    let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    let filenames = output_filenames(&names, extension, options.numbered);
    let mut files: Vec<RuleFile> = sections
        .iter()
        .zip(filenames)
        .map(|(section, filename)| RuleFile {
            kind: section.kind,
            directory: section.directory.clone(),
            filename,
            contents: String::new(),
        })
        .collect();
    let index = SectionIndex::from_filenames(files.iter().map(RuleFile::relative_path));

    for (section, file) in sections.iter_mut().zip(&mut files) {
        if options.resolve_links {
            let path = file.relative_path();
            section.content = hash_to_relative(&section.content, index.position_to_filename(), parent_dir(&path));
        }
        if options.promote_headings {
            section.content = promote_headings(&section.content);
        }
        debug!(section = %section.name, file = %file.filename, kind = %section.kind, "rendered rule file");
        file.contents = render_rule_file(section, dialect);
    }

    let preamble = preamble.map(|mut section| {
        section.name = PREAMBLE_NAME.to_string();
        let filename = if options.numbered {
            format!("00-{PREAMBLE_NAME}.{extension}")
        } else {
            format!("{PREAMBLE_NAME}.{extension}")
        };
        let mut file = RuleFile {
            kind: SectionKind::Rule,
            directory: None,
            filename,
            contents: String::new(),
        };
        if options.resolve_links {
            let path = file.relative_path();
            section.content = hash_to_relative(&section.content, index.position_to_filename(), parent_dir(&path));
        }
        file.contents = render_rule_file(&section, dialect);
        file
    });

    info!(
        dialect = %dialect,
        files = files.len(),
        preamble = preamble.is_some(),
        "decomposed document"
    );

    Decomposition {
        preamble,
        sections,
        files,
    }
}

fn lift_metadata(section: &mut Section) {
    let existing = std::mem::take(&mut section.description);
    extract_metadata(&section.content).apply_to(section);
    if !existing.trim().is_empty() {
        section.description = existing;
    }
    if section.description.is_empty() {
        section.description = derive_description(&section.content);
    }
}

/// Render a section as a complete rule file for `dialect`.
///
/// Dialects without frontmatter get inline callouts; the description is
/// written only when the body would not derive the same one, or when the
/// body opens with a blockquote that would otherwise be read back as it.
pub fn render_rule_file(section: &Section, dialect: Dialect) -> String {
    match dialect.frontmatter_flavor() {
        FrontmatterFlavor::Callouts => {
            let derived = derive_description(&section.content);
            let leading_quote = extract_metadata(&section.content).description.is_some();
            let description = Some(section.description.clone())
                .filter(|d| !d.trim().is_empty() && (leading_quote || *d != derived));
            let block = MetadataBlock {
                description,
                globs: section.globs.clone(),
                always_apply: section.always_apply,
                kind: section.kind,
            };
            with_frontmatter(None, &inject_metadata(&section.content, &block))
        }
        flavor => {
            let block = flavor.render(&FrontmatterFields {
                description: &section.description,
                globs: section.globs.as_deref(),
                always_apply: section.always_apply,
                kind: section.kind,
            });
            with_frontmatter(block.as_deref(), &section.content)
        }
    }
}
