//! Error types for docset ingestion and retrieval.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the ingestion and retrieval pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The docset bundle is missing required structure (index database,
    /// documents directory) or its search index cannot be read.
    #[error("invalid docset bundle at {}: {reason}", .path.display())]
    InvalidBundle { path: PathBuf, reason: String },

    /// The tokenizer could not be loaded or a token window could not be
    /// decoded back to text.
    #[error("chunking failed: {0}")]
    Chunking(String),

    /// The embedding backend rejected a request or returned an unusable
    /// response.
    #[error("embedding backend error: {message}")]
    EmbeddingBackend { message: String },

    /// A vector's length does not match what the operation requires.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A persisted index artifact failed structural validation.
    #[error("corrupt index artifact: {0}")]
    IndexCorrupt(String),

    /// A search was issued against an index with no rows.
    #[error("index contains no vectors")]
    IndexEmpty,

    /// A caller-supplied parameter is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An underlying filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
