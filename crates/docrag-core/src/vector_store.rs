//! Vector store trait

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{IndexedPassage, RetrievedPassage};

/// Trait for vector stores (e.g., in-memory, Qdrant)
///
/// A store establishes its dimensionality with the first vector it accepts;
/// every later upsert and query must match it.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist passages.
    ///
    /// Not idempotent: upserting the same passage twice may store it twice.
    /// A batch containing a vector of the wrong dimensionality fails with
    /// [`StoreError::DimensionMismatch`] and nothing from it is written.
    async fn upsert(&self, passages: Vec<IndexedPassage>) -> Result<(), StoreError>;

    /// Return up to `k` passages nearest to `query`, best first.
    ///
    /// An empty store yields an empty result, and `k` larger than the
    /// population returns every passage.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedPassage>, StoreError>;
}
