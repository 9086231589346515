//! Qdrant-backed vector store

use async_trait::async_trait;
use qdrant_client::{Payload, Qdrant};
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfig;
use qdrant_client::qdrant::{
    CollectionInfo, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use docrag_core::{ConfigError, IndexedPassage, Metadata, RetrievedPassage, StoreError, VectorStore};

use crate::config::StoreConfig;

const TEXT_KEY: &str = "text";
const METADATA_KEY: &str = "metadata";

/// Vector store adapter over a single Qdrant collection
///
/// The collection is created on first upsert, sized by that batch, with
/// cosine distance. Scores returned by Qdrant are cosine similarities.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: Mutex<Option<usize>>,
}

impl QdrantVectorStore {
    pub fn new(config: &StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = Qdrant::from_url(&config.url())
            .build()
            .map_err(|e| ConfigError::new(format!("failed to build Qdrant client: {}", e)))?;

        Ok(Self {
            client,
            collection: config.index_name.clone(),
            dimension: Mutex::new(None),
        })
    }

    /// Create a store from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(&StoreConfig::from_env()?)
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Dimensionality of the collection, creating it with `wanted` if absent
    async fn ensure_collection(&self, wanted: usize) -> Result<usize, StoreError> {
        let mut dimension = self.dimension.lock().await;
        if let Some(known) = *dimension {
            return Ok(known);
        }

        let established = match self.existing_dimension().await? {
            Some(size) => size,
            None => {
                // Another writer may create the collection between the check
                // and this call; Qdrant rejects the second create.
                self.client
                    .create_collection(
                        CreateCollectionBuilder::new(self.collection.clone())
                            .vectors_config(VectorParamsBuilder::new(wanted as u64, Distance::Cosine)),
                    )
                    .await
                    .map_err(unavailable)?;
                info!(collection = %self.collection, dimension = wanted, "created Qdrant collection");
                wanted
            }
        };

        *dimension = Some(established);
        Ok(established)
    }

    /// Dimensionality of the collection if it exists
    async fn known_dimension(&self) -> Result<Option<usize>, StoreError> {
        let mut dimension = self.dimension.lock().await;
        if dimension.is_none() {
            *dimension = self.existing_dimension().await?;
        }
        Ok(*dimension)
    }

    async fn existing_dimension(&self) -> Result<Option<usize>, StoreError> {
        let exists = self
            .client
            .collection_exists(self.collection.clone())
            .await
            .map_err(unavailable)?;
        if !exists {
            return Ok(None);
        }

        let response = self
            .client
            .collection_info(self.collection.clone())
            .await
            .map_err(unavailable)?;

        response
            .result
            .as_ref()
            .and_then(vector_size)
            .map(Some)
            .ok_or_else(|| {
                StoreError::Unavailable(format!(
                    "collection {} has no single unnamed vector configuration",
                    self.collection
                ))
            })
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, passages: Vec<IndexedPassage>) -> Result<(), StoreError> {
        let Some(first) = passages.first() else {
            return Ok(());
        };

        let batch_dimension = first.dimension();
        check_dimensions(&passages, batch_dimension)?;
        let expected = self.ensure_collection(batch_dimension).await?;
        check_dimensions(&passages, expected)?;

        let count = passages.len();
        let points = passages
            .into_iter()
            .map(|passage| {
                let payload = to_payload(&passage)?;
                Ok(PointStruct::new(
                    Uuid::new_v4().to_string(),
                    passage.vector,
                    Payload::from(payload),
                ))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(self.collection.clone(), points).wait(true))
            .await
            .map_err(unavailable)?;

        debug!(collection = %self.collection, count, "upserted points");
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedPassage>, StoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let Some(expected) = self.known_dimension().await? else {
            return Ok(Vec::new());
        };
        if query.len() != expected {
            return Err(StoreError::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(self.collection.clone(), query.to_vec(), k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(unavailable)?;

        response
            .result
            .iter()
            .map(|point| from_payload(&point.payload, point.score))
            .collect()
    }
}

fn unavailable(err: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn check_dimensions(passages: &[IndexedPassage], expected: usize) -> Result<(), StoreError> {
    match passages.iter().find(|p| p.dimension() != expected) {
        Some(bad) => Err(StoreError::DimensionMismatch {
            expected,
            actual: bad.dimension(),
        }),
        None => Ok(()),
    }
}

fn vector_size(info: &CollectionInfo) -> Option<usize> {
    let vectors = info.config.as_ref()?.params.as_ref()?.vectors_config.as_ref()?;
    match vectors.config.as_ref()? {
        VectorsConfig::Params(params) => Some(params.size as usize),
        VectorsConfig::ParamsMap(_) => None,
    }
}

fn string_value(value: String) -> Value {
    Value {
        kind: Some(Kind::StringValue(value)),
    }
}

fn to_payload(passage: &IndexedPassage) -> Result<HashMap<String, Value>, StoreError> {
    let metadata = serde_json::to_string(&passage.metadata)
        .map_err(|e| StoreError::Unavailable(format!("failed to encode metadata: {}", e)))?;

    let mut payload = HashMap::new();
    payload.insert(TEXT_KEY.to_string(), string_value(passage.text.clone()));
    payload.insert(METADATA_KEY.to_string(), string_value(metadata));
    Ok(payload)
}

fn from_payload(payload: &HashMap<String, Value>, score: f32) -> Result<RetrievedPassage, StoreError> {
    let text = match payload.get(TEXT_KEY).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(text)) => text.clone(),
        _ => {
            return Err(StoreError::Unavailable(format!(
                "point payload is missing the {:?} field",
                TEXT_KEY
            )));
        }
    };

    let metadata = match payload.get(METADATA_KEY).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(raw)) => serde_json::from_str::<Metadata>(raw)
            .map_err(|e| StoreError::Unavailable(format!("failed to decode metadata: {}", e)))?,
        _ => Metadata::new(),
    };

    Ok(RetrievedPassage { text, score, metadata })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::{CollectionConfig, CollectionParams, VectorParams, VectorsConfig as VectorsConfigMessage};

    #[test]
    fn test_payload_keeps_text_and_metadata() {
        let passage = IndexedPassage::new("There were twelve chapters.", vec![0.1, 0.2])
            .with_metadata("chunk_index", 7)
            .with_metadata("source", "alice.md");

        let payload = to_payload(&passage).unwrap();
        let restored = from_payload(&payload, 0.75).unwrap();

        assert_eq!(restored.text, passage.text);
        assert_eq!(restored.metadata, passage.metadata);
        assert_eq!(restored.score, 0.75);
    }

    #[test]
    fn test_payload_without_text_is_rejected() {
        let mut payload = HashMap::new();
        payload.insert(METADATA_KEY.to_string(), string_value("{}".to_string()));
        assert!(matches!(from_payload(&payload, 1.0), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_payload_without_metadata_defaults_empty() {
        let mut payload = HashMap::new();
        payload.insert(TEXT_KEY.to_string(), string_value("hello".to_string()));
        let passage = from_payload(&payload, 0.5).unwrap();
        assert!(passage.metadata.is_empty());
    }

    #[test]
    fn test_vector_size_from_collection_info() {
        let info = CollectionInfo {
            config: Some(CollectionConfig {
                params: Some(CollectionParams {
                    vectors_config: Some(VectorsConfigMessage {
                        config: Some(VectorsConfig::Params(VectorParams {
                            size: 384,
                            distance: Distance::Cosine.into(),
                            ..Default::default()
                        })),
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(vector_size(&info), Some(384));
        assert_eq!(vector_size(&CollectionInfo::default()), None);
    }

    #[test]
    fn test_check_dimensions() {
        let passages = vec![
            IndexedPassage::new("a", vec![0.0; 384]),
            IndexedPassage::new("b", vec![0.0; 768]),
        ];
        assert_eq!(
            check_dimensions(&passages, 384),
            Err(StoreError::DimensionMismatch {
                expected: 384,
                actual: 768
            })
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = StoreConfig {
            index_name: " ".to_string(),
            ..Default::default()
        };
        assert!(QdrantVectorStore::new(&config).is_err());
    }
}
