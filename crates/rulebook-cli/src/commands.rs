//! Subcommand handlers.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rulebook_assist::{AnthropicConfig, AnthropicGroupingProvider, assisted_decompose};
use rulebook_core::Dialect;
use rulebook_core::compose::compose as compose_sections;
use rulebook_core::decompose::{decompose as decompose_text, decompose_sections};
use rulebook_core::placeholders::{detect_dialect, placeholderize as placeholderize_text, resolve_with};
use rulebook_settings::Settings;
use tracing::info;

use crate::layout::{read_layout, write_layout};

/// Arguments of `rulebook decompose`.
pub struct DecomposeArgs {
    pub input: PathBuf,
    pub out: PathBuf,
    pub dialect: Option<Dialect>,
    pub no_number: bool,
    pub assist: bool,
}

/// `rulebook decompose`
pub async fn decompose(settings: &Settings, args: &DecomposeArgs) -> Result<()> {
    let text = read_text(&args.input)?;
    let dialect = args.dialect.unwrap_or(settings.default_dialect);
    let mut options = settings.decompose.options();
    if args.no_number {
        options.numbered = false;
    }

    let decomposition = if args.assist || settings.assist.enabled {
        let config = AnthropicConfig::from_settings(&settings.assist)?;
        let provider = AnthropicGroupingProvider::new(config)?;
        let outcome = assisted_decompose(&provider, &text).await;
        if let Some(reason) = outcome.reason.as_deref() {
            eprintln!("assist: using headings as-is ({reason})");
        }
        for warning in &outcome.warnings {
            eprintln!("warning: {warning}");
        }
        decompose_sections(outcome.sections, outcome.preamble, dialect, options)
    } else {
        decompose_text(&text, dialect, options)
    };

    let written = write_layout(&args.out, &decomposition, &settings.layout)?;
    info!(files = written.len(), dialect = %dialect, "decompose finished");
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}

/// `rulebook compose`
pub fn compose(
    settings: &Settings,
    dir: &Path,
    dialect: Option<Dialect>,
    out: Option<&Path>,
    title: Option<String>,
) -> Result<()> {
    let dialect = dialect.unwrap_or(settings.default_dialect);
    let sections = read_layout(dir, &settings.layout)?;
    if sections.is_empty() {
        bail!("no rule files found under {}", dir.display());
    }

    let mut options = settings.compose.options();
    if title.is_some() {
        options.title = title;
    }
    let composition = compose_sections(&sections, dialect, &options);

    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            std::fs::write(path, &composition.text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => write_stdout(&composition.text)?,
    }
    eprintln!(
        "{} sections, {} placeholders resolved for {}",
        sections.len(),
        composition.placeholder_count,
        dialect.display_name()
    );
    Ok(())
}

/// `rulebook detect`
pub fn detect(file: &Path) -> Result<()> {
    let text = read_text(file)?;
    match detect_dialect(&text) {
        Some(dialect) => {
            println!("{}", dialect.id());
            Ok(())
        }
        None => bail!("no dialect detected in {}", file.display()),
    }
}

/// `rulebook placeholderize`
pub fn placeholderize(file: &Path, dialect: Option<Dialect>) -> Result<()> {
    let text = read_text(file)?;
    let Some(dialect) = dialect.or_else(|| detect_dialect(&text)) else {
        bail!("no dialect detected in {}; pass --dialect", file.display());
    };

    let (rewritten, replacements) = placeholderize_text(&text, dialect);
    write_stdout(&rewritten)?;
    for replacement in &replacements {
        eprintln!(
            "{{{{{}}}}}: {} x {:?}",
            replacement.name, replacement.count, replacement.value
        );
    }
    Ok(())
}

/// `rulebook resolve`
pub fn resolve(file: &Path, dialect: Dialect) -> Result<()> {
    let text = read_text(file)?;
    let resolution = resolve_with(&text, dialect.placeholders());
    write_stdout(&resolution.text)?;
    eprintln!(
        "{} placeholders resolved, {} lines elided",
        resolution.substituted, resolution.elided_lines
    );
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Failed to write to stdout")
}
