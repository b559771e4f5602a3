//! # rulebook-core
//!
//! Bidirectional transformation between one monolithic agent-instructions
//! document and a set of modular rule files.
//!
//! Everything in this crate is synchronous and pure: functions take text and
//! small value parameters and return new text (plus warnings where relevant).
//! Reading and writing files is left to the caller.
//!
//! ## Module Overview
//!
//! - [`lines`]: Line tokenizer (headings, callouts, blockquotes, fences)
//! - [`headings`]: Heading depth shifting, ordinal stripping, section numbering
//! - [`slug`]: Slug and description derivation
//! - [`segment`]: Split a document on top-level section headings
//! - [`metadata`]: Extract/inject inline metadata callouts
//! - [`frontmatter`]: Rule-file frontmatter parsing and per-dialect rendering
//! - [`dialect`]: Supported downstream tools and their placeholder tables
//! - [`placeholders`]: `{{NAME}}` resolution, placeholderizing, dialect detection
//! - [`links`]: Cross-reference rewriting between file links and anchors
//! - [`reconstruct`]: Rebuild sections from machine-proposed groupings
//! - [`compose`]: Join sections into one document for a dialect
//! - [`decompose`]: Split a document into rendered rule files
//!
//! ## Round trip
//!
//! ```rust,ignore
//! use rulebook_core::Dialect;
//! use rulebook_core::compose::{ComposeOptions, compose};
//! use rulebook_core::decompose::{DecomposeOptions, decompose};
//!
//! let split = decompose(source, Dialect::Cursor, DecomposeOptions::default());
//! let joined = compose(&split.sections, Dialect::Claude, &ComposeOptions::default());
//! ```

#![deny(unsafe_code)]

pub mod compose;
pub mod decompose;
pub mod dialect;
pub mod frontmatter;
pub mod headings;
pub mod links;
pub mod lines;
pub mod metadata;
pub mod placeholders;
pub mod reconstruct;
pub mod segment;
pub mod slug;
pub mod types;

pub use dialect::Dialect;
pub use types::{Document, Section, SectionKind};
