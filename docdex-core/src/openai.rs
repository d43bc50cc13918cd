//! OpenAI embedding backend.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedder::Embedder;
use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_BATCH_SIZE: usize = 50;

/// [`Embedder`] backed by the OpenAI embeddings API.
///
/// The API key is supplied at construction; nothing global is consulted
/// after that. Batches larger than the configured batch size are split
/// into several requests transparently.
///
/// # Example
///
/// ```no_run
/// use docdex_core::OpenAiEmbedder;
///
/// let embedder = OpenAiEmbedder::new("sk-...")
///     .with_model("text-embedding-3-small")
///     .with_batch_size(50);
/// ```
pub struct OpenAiEmbedder {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
    batch_size: usize,
}

impl OpenAiEmbedder {
    /// Creates an embedder using `api_key` for authentication.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Creates an embedder from the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the variable is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            Error::InvalidArgument("OPENAI_API_KEY environment variable is not set".into())
        })?;
        Ok(Self::new(api_key))
    }

    /// Sets the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API base URL. Intended for proxies and tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets how many texts are embedded per request. A zero batch size is
    /// treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Model name requests are issued with.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_embeddings(&self, batch: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: batch,
        };
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        debug!(model = %self.model, texts = batch.len(), "requesting embeddings");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|err| Error::EmbeddingBackend {
                message: format!("request failed: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(Error::EmbeddingBackend {
                message: format!("API error ({status}): {message}"),
            });
        }

        let parsed: EmbeddingResponse = response.json().map_err(|err| Error::EmbeddingBackend {
            message: format!("malformed response: {err}"),
        })?;
        if parsed.data.len() != batch.len() {
            return Err(Error::EmbeddingBackend {
                message: format!(
                    "backend returned {} embeddings for {} texts",
                    parsed.data.len(),
                    batch.len()
                ),
            });
        }
        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let mut vectors = self.request_embeddings(batch)?;
            embeddings.append(&mut vectors);
        }
        Ok(embeddings)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}
