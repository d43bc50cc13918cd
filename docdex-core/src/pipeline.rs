//! End-to-end ingestion: extract, chunk, embed, index.

use std::path::Path;

use tracing::{error, info};

use crate::chunker::TokenChunker;
use crate::config::PipelineConfig;
use crate::docset::DocsetBundle;
use crate::document::{Chunk, ChunkMeta, DocumentEntry};
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::index::VectorIndex;

/// Drives a docset from bundle directory to in-memory index.
///
/// The index dimension is taken from the first embedding the backend
/// returns; every later vector must match it.
pub struct IngestPipeline {
    chunker: TokenChunker,
    embedder: Box<dyn Embedder>,
}

impl IngestPipeline {
    /// Creates a pipeline from a validated configuration and an
    /// embedding backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the chunking parameters are
    /// out of range and [`Error::Chunking`] if the tokenizer cannot be
    /// loaded.
    pub fn new(config: &PipelineConfig, embedder: Box<dyn Embedder>) -> Result<Self> {
        let chunker = TokenChunker::from_config(config)?;
        Ok(Self { chunker, embedder })
    }

    /// Ingests a docset bundle from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBundle`] if the bundle layout is invalid
    /// or no indexed document has a readable backing file, plus any error
    /// from [`IngestPipeline::ingest`].
    pub fn ingest_docset(&self, path: impl AsRef<Path>) -> Result<VectorIndex> {
        let bundle = DocsetBundle::open(&path)?;
        let entries = bundle.documents()?;
        if entries.is_empty() {
            return Err(Error::InvalidBundle {
                path: path.as_ref().to_path_buf(),
                reason: "no indexed documents with readable backing files".into(),
            });
        }
        self.ingest(&entries)
    }

    /// Chunks, embeds, and indexes a set of documents.
    ///
    /// Chunks are embedded in document order, so row `i` of the returned
    /// index always describes the `i`-th chunk produced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Chunking`] if the documents produce no chunks,
    /// [`Error::EmbeddingBackend`] if embedding fails or the backend
    /// returns the wrong number of vectors, and
    /// [`Error::DimensionMismatch`] if the backend's vectors disagree in
    /// length.
    pub fn ingest(&self, entries: &[DocumentEntry]) -> Result<VectorIndex> {
        let mut chunks: Vec<Chunk> = Vec::new();
        for entry in entries {
            chunks.extend(self.chunker.chunk(entry)?);
        }
        if chunks.is_empty() {
            return Err(Error::Chunking(format!(
                "no chunks produced from {} documents",
                entries.len()
            )));
        }
        info!(documents = entries.len(), chunks = chunks.len(), "chunked documents");

        let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).inspect_err(|err| {
            error!(chunks = texts.len(), error = %err, "embedding failed during ingestion");
        })?;
        if embeddings.len() != chunks.len() {
            return Err(Error::EmbeddingBackend {
                message: format!(
                    "backend returned {} embeddings for {} chunks",
                    embeddings.len(),
                    chunks.len()
                ),
            });
        }
        let Some(first) = embeddings.first() else {
            return Err(Error::EmbeddingBackend {
                message: "backend returned no embeddings".into(),
            });
        };
        let dimension = first.len();
        info!(embeddings = embeddings.len(), dimension, "embedded chunks");

        let metadata: Vec<ChunkMeta> = chunks
            .iter()
            .map(|chunk| ChunkMeta {
                name: chunk.source_name.clone(),
                text: chunk.text.clone(),
            })
            .collect();
        let mut index = VectorIndex::new(dimension)?;
        index.add(embeddings, metadata)?;

        info!(rows = index.len(), dimension, "built index");
        Ok(index)
    }
}
