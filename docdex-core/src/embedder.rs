//! Embedding backend abstraction.

use crate::error::{Error, Result};

/// Turns text into fixed-length vectors.
///
/// Implementations must be order-preserving and length-preserving: the
/// vector at position `i` of the output embeds the text at position `i`
/// of the input, and the output has exactly one vector per input text.
/// Every vector from the same backend has the same length.
pub trait Embedder: Send + Sync {
    /// Embeds a batch of texts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmbeddingBackend`] if the backend rejects the
    /// request or returns an unusable response.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embeds a single text as a one-element batch.
    ///
    /// # Errors
    ///
    /// Same as [`Embedder::embed_batch`].
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(&[text])?;
        if embeddings.len() != 1 {
            return Err(Error::EmbeddingBackend {
                message: format!(
                    "backend returned {} embeddings for a single text",
                    embeddings.len()
                ),
            });
        }
        Ok(embeddings.remove(0))
    }
}

/// Deterministic offline embedder.
///
/// Hashes each text and expands the hash into a normalized vector, so
/// identical texts always embed to identical vectors. Useful for tests
/// and for exercising the pipeline without network access; the vectors
/// carry no semantic signal.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    /// Creates a mock embedder producing vectors of `dimension` values.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Vector length this embedder produces.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let hash = text
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| {
                let seed = hash.wrapping_add(i as u64 * 2_654_435_761) as f32;
                (seed * 0.001).sin()
            })
            .collect();
        let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }
        embedding
    }
}

impl Embedder for MockEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
