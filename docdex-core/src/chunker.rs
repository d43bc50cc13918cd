//! Token-window chunking.
//!
//! Documents are split on token boundaries rather than characters so that
//! every chunk fits the embedding model's context window exactly. Windows
//! are `max_tokens` long and advance by `max_tokens - overlap`, so
//! consecutive chunks share `overlap` tokens of context.

use tiktoken_rs::{CoreBPE, cl100k_base};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::document::{Chunk, DocumentEntry};
use crate::error::{Error, Result};

/// Splits document text into overlapping token windows.
pub struct TokenChunker {
    bpe: CoreBPE,
    max_tokens: usize,
    overlap: usize,
}

impl std::fmt::Debug for TokenChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // CoreBPE does not implement Debug, so the tokenizer is elided.
        f.debug_struct("TokenChunker")
            .field("max_tokens", &self.max_tokens)
            .field("overlap", &self.overlap)
            .finish_non_exhaustive()
    }
}

impl TokenChunker {
    /// Creates a chunker with the given window size and overlap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `max_tokens` is zero or
    /// `overlap` is not strictly less than `max_tokens`, and
    /// [`Error::Chunking`] if the tokenizer tables cannot be loaded.
    pub fn new(max_tokens: usize, overlap: usize) -> Result<Self> {
        if max_tokens == 0 {
            return Err(Error::InvalidArgument(
                "max_tokens must be greater than zero".into(),
            ));
        }
        if overlap >= max_tokens {
            return Err(Error::InvalidArgument(format!(
                "overlap ({overlap}) must be less than max_tokens ({max_tokens})"
            )));
        }
        let bpe = cl100k_base()
            .map_err(|err| Error::Chunking(format!("cannot load cl100k_base tokenizer: {err}")))?;
        Ok(Self {
            bpe,
            max_tokens,
            overlap,
        })
    }

    /// Creates a chunker from a pipeline configuration.
    ///
    /// # Errors
    ///
    /// Same as [`TokenChunker::new`].
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(config.max_tokens, config.overlap)
    }

    /// Number of tokens `text` encodes to.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Cuts a document into overlapping token windows.
    ///
    /// Tokenizes the document once, then walks the token sequence in
    /// steps of `max_tokens - overlap`, decoding each window back to
    /// text. A document shorter than `max_tokens` yields exactly one
    /// chunk; an empty document yields none. Chunks carry their source
    /// name and half-open token span.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Chunking`] if a token window cannot be decoded.
    pub fn chunk(&self, entry: &DocumentEntry) -> Result<Vec<Chunk>> {
        let tokens = self.bpe.encode_ordinary(&entry.text);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let stride = self.max_tokens - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0usize;
        while start < tokens.len() {
            let end = usize::min(start + self.max_tokens, tokens.len());
            let window = tokens[start..end].to_vec();
            let text = self.bpe.decode(window).map_err(|err| {
                Error::Chunking(format!(
                    "cannot decode token window [{start}, {end}) of {}: {err}",
                    entry.name
                ))
            })?;
            chunks.push(Chunk {
                source_name: entry.name.clone(),
                text,
                token_span: (start, end),
            });
            start += stride;
        }

        debug!(
            document = %entry.name,
            tokens = tokens.len(),
            chunks = chunks.len(),
            "chunked document"
        );
        Ok(chunks)
    }
}
