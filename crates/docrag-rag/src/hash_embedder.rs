//! Offline feature-hashing embedder
//!
//! Produces bag-of-words vectors with no model server. Useful for local runs
//! and tests; retrieval quality is lexical, not semantic.
//!
//! Token buckets come from the first eight bytes of the token's MD5 digest,
//! so a vector stored in a persistent collection stays comparable across
//! processes, builds and toolchains.

use async_trait::async_trait;

use docrag_core::{EmbeddingClient, EmbeddingError, EmbeddingVector};

pub const DEFAULT_HASH_DIMENSION: usize = 384;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    model: String,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model: format!("hash-{}", dimension),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> EmbeddingVector {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokens(text) {
            let hash = token_hash(&token);
            let idx = (hash % self.dimension as u64) as usize;
            // one sign bit keeps unrelated collisions from only adding up
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

fn token_hash(token: &str) -> u64 {
    let digest = md5::compute(token.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.0[..8]);
    u64::from_le_bytes(head)
}

/// Lowercased alphanumeric words with a trailing plural `s` dropped
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut word = word.to_lowercase();
            if word.chars().count() > 3 && word.ends_with('s') && !word.ends_with("ss") {
                word.pop();
            }
            word
        })
}

#[async_trait]
impl EmbeddingClient for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        Ok(self.embed(text))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::cosine_similarity;

    #[test]
    fn test_tokens() {
        let words: Vec<String> = tokens("How many Chapters? Alice's glass").collect();
        assert_eq!(words, vec!["how", "many", "chapter", "alice", "s", "glass"]);
    }

    #[tokio::test]
    async fn test_buckets_are_fixed() {
        // "chapter" lands in bucket 378 of 384 with a negative sign
        let vector = HashEmbedder::default().embed_query("chapters").await.unwrap();
        assert_eq!(vector[378], -1.0);
        assert_eq!(vector.iter().filter(|x| **x != 0.0).count(), 1);

        let vector = HashEmbedder::new(64).embed_query("Alice").await.unwrap();
        assert_eq!(vector[35], -1.0);
    }

    #[tokio::test]
    async fn test_vectors_are_normalized() {
        let embedder = HashEmbedder::default();
        let vector = embedder.embed_query("Down the rabbit hole").await.unwrap();

        assert_eq!(vector.len(), 384);
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(8);
        let vector = embedder.embed_query("   ").await.unwrap();
        assert_eq!(vector, vec![0.0; 8]);
    }

    #[tokio::test]
    async fn test_shared_words_score_higher() {
        let embedder = HashEmbedder::default();
        let query = embedder.embed_query("How many chapters?").await.unwrap();
        let related = embedder.embed_query("The book has twelve chapters.").await.unwrap();
        let unrelated = embedder.embed_query("Tea with the Hatter").await.unwrap();

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_batch_matches_query() {
        let embedder = HashEmbedder::new(64);
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let batch = embedder.embed_batch(&texts).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], embedder.embed_query("beta").await.unwrap());
        assert_eq!(embedder.model_name(), "hash-64");
    }
}
