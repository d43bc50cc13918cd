//! Data types shared across the ingestion and retrieval stages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A document pulled out of a docset bundle: one search-index row joined
/// with the visible text of its backing HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    /// Symbol or page name as recorded in the docset search index.
    pub name: String,
    /// Path of the backing page, relative to the bundle's documents
    /// directory.
    pub path: PathBuf,
    /// Visible text of the page, whitespace-normalized.
    pub text: String,
}

impl DocumentEntry {
    /// Creates an entry from its parts.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A token window cut from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Name of the document the window was cut from.
    pub source_name: String,
    /// Decoded text of the window.
    pub text: String,
    /// Half-open token range `[start, end)` into the document's token
    /// sequence.
    pub token_span: (usize, usize),
}

/// Metadata persisted alongside each vector row.
///
/// Row `i` of the index describes the chunk stored at position `i` of the
/// metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    /// Source document name.
    pub name: String,
    /// Chunk text.
    pub text: String,
}

/// One retrieval result: chunk metadata joined with its distance from the
/// query vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Source document name.
    pub name: String,
    /// Chunk text.
    pub chunk: String,
    /// Squared Euclidean distance from the query vector. Smaller is
    /// closer; identical vectors score `0.0`.
    pub distance: f32,
}
