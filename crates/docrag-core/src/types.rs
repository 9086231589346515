//! Common types used across the docrag pipeline

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Embedding vector produced by a single model
pub type EmbeddingVector = Vec<f32>;

/// Free-form passage metadata
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Raw text ingested by one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source: Option<String>,
}

impl Document {
    /// Create a document from in-memory text
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: None,
        }
    }

    /// Record where the document came from
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Load a UTF-8 document from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(content).with_source(path.display().to_string()))
    }
}

/// One retrievable slice of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Position in the chunk sequence, for traceability only
    pub index: usize,
}

/// Unit persisted by a vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedPassage {
    pub text: String,
    pub vector: EmbeddingVector,
    pub metadata: Metadata,
}

impl IndexedPassage {
    pub fn new(text: impl Into<String>, vector: EmbeddingVector) -> Self {
        Self {
            text: text.into(),
            vector,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Search hit returned by a vector store
///
/// `score` is a cosine similarity: higher is closer, and stores return hits
/// in descending score order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Output of a successful pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub prompt: String,
    pub passages: Vec<RetrievedPassage>,
    pub completion: String,
    pub chunks_indexed: usize,
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Loaded,
    Chunked,
    Indexed,
    Retrieved,
    Assembled,
    Answered,
}

impl Stage {
    /// The stage that follows this one, if any
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Loaded => Some(Stage::Chunked),
            Stage::Chunked => Some(Stage::Indexed),
            Stage::Indexed => Some(Stage::Retrieved),
            Stage::Retrieved => Some(Stage::Assembled),
            Stage::Assembled => Some(Stage::Answered),
            Stage::Answered => None,
        }
    }

    /// Verb describing the work done to reach this stage
    pub fn activity(&self) -> &'static str {
        match self {
            Stage::Loaded => "loading",
            Stage::Chunked => "chunking",
            Stage::Indexed => "indexing",
            Stage::Retrieved => "retrieving",
            Stage::Assembled => "assembling",
            Stage::Answered => "answering",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.activity())
    }
}
