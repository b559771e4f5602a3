//! # rulebook
//!
//! Split a single agent instruction document into per-topic rule files and
//! compose them back, for any supported tool dialect.

#![deny(unsafe_code)]

mod commands;
mod layout;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rulebook_core::Dialect;

/// Split and rebuild agent instruction documents.
#[derive(Parser, Debug)]
#[command(name = "rulebook", version, about = "Split and rebuild agent instruction documents")]
struct Cli {
    /// Log level when `RUST_LOG` is unset (overrides settings).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory holding `.rulebook.json` (defaults to the working directory).
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a document into rule files.
    Decompose {
        /// Source document.
        input: PathBuf,
        /// Layout root to write into.
        #[arg(long)]
        out: PathBuf,
        /// Target dialect (defaults to settings).
        #[arg(long)]
        dialect: Option<Dialect>,
        /// Write filenames without position prefixes.
        #[arg(long)]
        no_number: bool,
        /// Ask a model to group sections.
        #[arg(long)]
        assist: bool,
    },
    /// Compose rule files into one document.
    Compose {
        /// Layout root to read from.
        dir: PathBuf,
        /// Target dialect (defaults to settings).
        #[arg(long)]
        dialect: Option<Dialect>,
        /// Output file (defaults to stdout).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Document title.
        #[arg(long)]
        title: Option<String>,
    },
    /// Print the dialect a document was written for.
    Detect {
        /// Document to inspect.
        file: PathBuf,
    },
    /// Replace dialect-specific values with `{{NAME}}` tokens.
    Placeholderize {
        /// Document to rewrite.
        file: PathBuf,
        /// Source dialect (defaults to detection).
        #[arg(long)]
        dialect: Option<Dialect>,
    },
    /// Resolve `{{NAME}}` tokens for a dialect.
    Resolve {
        /// Document to rewrite.
        file: PathBuf,
        /// Target dialect.
        #[arg(long)]
        dialect: Dialect,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let project = match cli.project {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to resolve working directory")?,
    };
    let settings =
        rulebook_settings::load_settings(Some(project.as_path())).context("Failed to load settings")?;

    let level = cli.log_level.as_deref().unwrap_or(&settings.logging.level);
    logging::init_subscriber(level);

    match cli.command {
        Command::Decompose {
            input,
            out,
            dialect,
            no_number,
            assist,
        } => {
            commands::decompose(
                &settings,
                &commands::DecomposeArgs {
                    input,
                    out,
                    dialect,
                    no_number,
                    assist,
                },
            )
            .await
        }
        Command::Compose {
            dir,
            dialect,
            out,
            title,
        } => commands::compose(&settings, &dir, dialect, out.as_deref(), title),
        Command::Detect { file } => commands::detect(&file),
        Command::Placeholderize { file, dialect } => commands::placeholderize(&file, dialect),
        Command::Resolve { file, dialect } => commands::resolve(&file, dialect),
    }
}
