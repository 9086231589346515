//! In-process vector store

use async_trait::async_trait;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use docrag_core::{IndexedPassage, RetrievedPassage, StoreError, VectorStore};

/// Brute-force cosine store held in memory
///
/// Passages keep their insertion order, which also breaks score ties.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    passages: RwLock<Vec<IndexedPassage>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().map(|passages| passages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality shared by every stored vector, once established
    pub fn dimension(&self) -> Option<usize> {
        self.read()
            .ok()
            .and_then(|passages| passages.first().map(IndexedPassage::dimension))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<IndexedPassage>>, StoreError> {
        self.passages
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<IndexedPassage>>, StoreError> {
        self.passages
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, batch: Vec<IndexedPassage>) -> Result<(), StoreError> {
        let mut passages = self.write()?;

        let expected = passages
            .first()
            .or_else(|| batch.first())
            .map(IndexedPassage::dimension);

        if let Some(expected) = expected {
            if let Some(bad) = batch.iter().find(|p| p.dimension() != expected) {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: bad.dimension(),
                });
            }
        }

        debug!(count = batch.len(), total = passages.len() + batch.len(), "upserting passages");
        passages.extend(batch);
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedPassage>, StoreError> {
        let passages = self.read()?;
        if k == 0 || passages.is_empty() {
            return Ok(Vec::new());
        }

        let expected = passages[0].dimension();
        if query.len() != expected {
            return Err(StoreError::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = passages
            .iter()
            .enumerate()
            .map(|(i, passage)| (i, cosine_similarity(query, &passage.vector)))
            .collect();

        // sort_by is stable, so equal scores stay in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| RetrievedPassage {
                text: passages[i].text.clone(),
                score,
                metadata: passages[i].metadata.clone(),
            })
            .collect())
    }
}

/// Cosine similarity of two equal-length vectors; 0 when either is all zeros
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(text: &str, vector: Vec<f32>) -> IndexedPassage {
        IndexedPassage::new(text, vector)
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_empty_store_search() {
        let store = InMemoryVectorStore::new();
        assert!(store.search(&[1.0, 0.0], 3).await.unwrap().is_empty());
        assert_eq!(store.dimension(), None);
    }

    #[tokio::test]
    async fn test_search_ranks_best_first() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![
                passage("east", vec![1.0, 0.0]),
                passage("north", vec![0.0, 1.0]),
                passage("north-east", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = store.search(&[0.0, 2.0], 2).await.unwrap();
        let names: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(names, vec!["north", "north-east"]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_k_larger_than_population() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![passage("a", vec![1.0, 0.0]), passage("b", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.search(&[1.0, 0.0], 10).await.unwrap().len(), 2);
        assert!(store.search(&[1.0, 0.0], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![
                passage("first", vec![1.0, 0.0]),
                passage("second", vec![2.0, 0.0]),
                passage("third", vec![3.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0], 3).await.unwrap();
        let names: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_leaves_store_unchanged() {
        let store = InMemoryVectorStore::new();
        store.upsert(vec![passage("a", vec![0.5; 384])]).await.unwrap();

        let err = store
            .upsert(vec![passage("b", vec![0.5; 384]), passage("c", vec![0.5; 768])])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            StoreError::DimensionMismatch {
                expected: 384,
                actual: 768
            }
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.dimension(), Some(384));
    }

    #[tokio::test]
    async fn test_mixed_batch_into_empty_store() {
        let store = InMemoryVectorStore::new();
        let err = store
            .upsert(vec![passage("a", vec![1.0; 3]), passage("b", vec![1.0; 4])])
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::DimensionMismatch { expected: 3, actual: 4 });
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch() {
        let store = InMemoryVectorStore::new();
        store.upsert(vec![passage("a", vec![1.0; 3])]).await.unwrap();

        let err = store.search(&[1.0; 5], 1).await.unwrap_err();
        assert_eq!(err, StoreError::DimensionMismatch { expected: 3, actual: 5 });
    }

    #[tokio::test]
    async fn test_search_returns_metadata() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![passage("a", vec![1.0, 0.0]).with_metadata("chunk_index", 0)])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits[0].metadata["chunk_index"], 0);
    }
}
