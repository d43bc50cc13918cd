//! Ingestion pipeline configuration.

use crate::error::{Error, Result};

/// Tuning knobs for docset ingestion.
///
/// Defaults match what works well for API reference pages: 500-token
/// windows with a 50-token overlap, embedded 50 texts per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum number of tokens per chunk.
    pub max_tokens: usize,
    /// Number of tokens shared between consecutive chunks.
    pub overlap: usize,
    /// Number of texts sent to the embedding backend per request.
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            overlap: 50,
            batch_size: 50,
        }
    }
}

impl PipelineConfig {
    /// Creates a builder seeded with the defaults.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`] with validation at build time.
///
/// # Example
///
/// ```
/// use docdex_core::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .max_tokens(256)
///     .overlap(32)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 256);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Sets the maximum number of tokens per chunk.
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Sets the token overlap between consecutive chunks.
    pub fn overlap(mut self, overlap: usize) -> Self {
        self.config.overlap = overlap;
        self
    }

    /// Sets the number of texts per embedding request.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Validates the configuration and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `max_tokens` or `batch_size`
    /// is zero, or if `overlap` is not strictly less than `max_tokens`.
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.max_tokens == 0 {
            return Err(Error::InvalidArgument(
                "max_tokens must be greater than zero".into(),
            ));
        }
        if self.config.overlap >= self.config.max_tokens {
            return Err(Error::InvalidArgument(format!(
                "overlap ({}) must be less than max_tokens ({})",
                self.config.overlap, self.config.max_tokens
            )));
        }
        if self.config.batch_size == 0 {
            return Err(Error::InvalidArgument(
                "batch_size must be greater than zero".into(),
            ));
        }
        Ok(self.config)
    }
}
