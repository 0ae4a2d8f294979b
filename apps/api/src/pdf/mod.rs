//! PDF toolkit built on `lopdf`: loading and saving, page tree surgery,
//! content-stream authoring, font registration and positioned text search.
//!
//! Nothing in here knows about proposals; the stamper and finalizer compose
//! these pieces.

use std::path::PathBuf;

use thiserror::Error;

mod cmap;
pub mod content;
pub mod document;
pub mod fonts;
pub mod text_search;

#[cfg(test)]
pub mod fixtures;

pub use content::ContentBuilder;
pub use fonts::{FontSource, LoadedFont};
pub use text_search::{find_text, TextMatch};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to open PDF {origin}: {reason}")]
    Open { origin: String, reason: String },

    #[error("failed to load font {path}: {reason}")]
    FontLoad { path: PathBuf, reason: String },

    #[error("malformed PDF structure: {0}")]
    Malformed(String),

    #[error("PDF object error: {0}")]
    Object(#[from] lopdf::Error),

    #[error("failed to write PDF: {0}")]
    Save(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
