//! Embedding client trait

use async_trait::async_trait;

use crate::error::EmbeddingError;
use crate::types::EmbeddingVector;

/// Trait for embedding backends (e.g., Ollama)
///
/// Both methods must map text into the same vector space: a store must never
/// hold vectors from two different models. Implementations do not retry.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed documents for indexing.
    ///
    /// The result is index-aligned with `texts`. The first failing item aborts
    /// the whole batch and no partial result is returned. An empty input
    /// yields an empty output.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError>;

    /// Embed a query at retrieval time
    async fn embed_query(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;

    /// Name of the model producing the vectors
    fn model_name(&self) -> &str;
}
