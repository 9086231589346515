//! Ollama embedding client

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use docrag_core::{ConfigError, EmbeddingClient, EmbeddingError, EmbeddingVector};

use crate::client::{CallFailure, OllamaHttp};
use crate::config::OllamaConfig;

const EMBEDDINGS_PATH: &str = "/api/embeddings";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedding client for a single Ollama model
#[derive(Clone)]
pub struct OllamaEmbedder {
    http: OllamaHttp,
    model: String,
    max_concurrency: usize,
}

impl OllamaEmbedder {
    /// Create a new embedder from configuration
    pub fn new(config: &OllamaConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: OllamaHttp::new(config)?,
            model: config.embedding_model.clone(),
            max_concurrency: config.max_concurrency,
        })
    }

    /// Create a new embedder from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = OllamaConfig::from_env()?;
        Self::new(&config)
    }

    /// Set the model used for embeddings
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Bound the number of requests in flight during `embed_batch`
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response: EmbeddingResponse = self
            .http
            .post_json(EMBEDDINGS_PATH, &request)
            .await
            .map_err(|failure| self.classify(failure))?;

        if response.embedding.is_empty() {
            return Err(EmbeddingError::DecodeFailure(format!(
                "model {} returned an empty embedding",
                self.model
            )));
        }

        Ok(response.embedding)
    }

    fn classify(&self, failure: CallFailure) -> EmbeddingError {
        match failure {
            CallFailure::Timeout(limit) => EmbeddingError::Timeout(limit),
            CallFailure::NotFound(_) => EmbeddingError::ModelNotFound(self.model.clone()),
            CallFailure::Decode(message) => EmbeddingError::DecodeFailure(message),
            other => EmbeddingError::TransportFailure(format!(
                "embedding request failed: {}",
                other.describe()
            )),
        }
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            model = %self.model,
            count = texts.len(),
            concurrency = self.max_concurrency,
            "embedding batch"
        );

        let requests: Vec<_> = texts.iter().map(|text| self.embed(text)).collect();

        // `buffered` yields in input order, so results stay index-aligned and
        // the first failure in input order ends the batch.
        stream::iter(requests)
            .buffered(self.max_concurrency)
            .try_collect()
            .await
    }

    async fn embed_query(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        self.embed(text).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
