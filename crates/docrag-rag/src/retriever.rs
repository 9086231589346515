//! Query-time retrieval

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use docrag_core::{EmbeddingClient, EmbeddingError, RetrievalError, RetrievedPassage, StoreError, VectorStore};

use crate::deadline::with_deadline;

/// Embeds a question and looks up its nearest passages
pub struct Retriever<E: ?Sized, S: ?Sized> {
    embedder: Arc<E>,
    store: Arc<S>,
    call_timeout: Duration,
}

impl<E: ?Sized, S: ?Sized> Clone for Retriever<E, S> {
    fn clone(&self) -> Self {
        Self {
            embedder: Arc::clone(&self.embedder),
            store: Arc::clone(&self.store),
            call_timeout: self.call_timeout,
        }
    }
}

impl<E, S> Retriever<E, S>
where
    E: EmbeddingClient + ?Sized,
    S: VectorStore + ?Sized,
{
    pub fn new(embedder: Arc<E>, store: Arc<S>, call_timeout: Duration) -> Self {
        Self {
            embedder,
            store,
            call_timeout,
        }
    }

    /// Top `k` passages for `question`, best first
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        let query = with_deadline(
            self.call_timeout,
            self.embedder.embed_query(question),
            EmbeddingError::Timeout,
        )
        .await?;

        let mut passages = with_deadline(
            self.call_timeout,
            self.store.search(&query, k),
            StoreError::Timeout,
        )
        .await?;
        passages.truncate(k);

        debug!(k, found = passages.len(), "retrieved passages");
        Ok(passages)
    }
}
