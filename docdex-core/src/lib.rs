//! Semantic search over API-reference docsets.
//!
//! A docset bundle (the format documentation browsers ship: a SQLite
//! search index plus a tree of HTML pages) goes in; a single-file vector
//! index comes out. Queries embed the question with the same model the
//! index was built with and scan the index under the squared Euclidean
//! metric.
//!
//! Ingestion runs in four stages:
//!
//! ```text
//! DocsetBundle -> TokenChunker -> Embedder -> VectorIndex
//! ```
//!
//! [`IngestPipeline`] wires the stages together; [`Retriever`] serves
//! queries against a loaded [`VectorIndex`]. The [`Embedder`] seam has
//! two implementations: [`OpenAiEmbedder`] for real embeddings and
//! [`MockEmbedder`] for offline work.
//!
//! # Example
//!
//! ```no_run
//! use docdex_core::{IngestPipeline, OpenAiEmbedder, PipelineConfig, Retriever, VectorIndex};
//!
//! # fn run() -> docdex_core::Result<()> {
//! let config = PipelineConfig::default();
//! let embedder = OpenAiEmbedder::from_env()?;
//! let pipeline = IngestPipeline::new(&config, Box::new(embedder))?;
//! let index = pipeline.ingest_docset("UIKit.docset")?;
//! index.save("uikit.docdex")?;
//!
//! let index = VectorIndex::load("uikit.docdex")?;
//! let retriever = Retriever::new(index, Box::new(OpenAiEmbedder::from_env()?));
//! for result in retriever.retrieve("how do I animate a view", 5)? {
//!     println!("{} ({:.4}): {}", result.name, result.distance, result.chunk);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod config;
pub mod docset;
pub mod document;
pub mod embedder;
pub mod error;
pub mod index;
pub mod openai;
pub mod pipeline;
pub mod retrieval;

pub use chunker::TokenChunker;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use docset::DocsetBundle;
pub use document::{Chunk, ChunkMeta, DocumentEntry, QueryResult};
pub use embedder::{Embedder, MockEmbedder};
pub use error::{Error, Result};
pub use index::{SearchHit, VectorIndex};
pub use openai::OpenAiEmbedder;
pub use pipeline::IngestPipeline;
pub use retrieval::Retriever;
