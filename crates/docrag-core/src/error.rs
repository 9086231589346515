//! Error types for the docrag pipeline
//!
//! Every collaborator has its own error enum so callers can tell whether a
//! fault came from the embedding backend, the vector store or the language
//! model. `ErrorKind` is the umbrella the pipeline reports, and
//! `PipelineError` pins it to the stage that was being entered.

use std::time::Duration;

use thiserror::Error;

use crate::types::Stage;

/// Result type alias using the umbrella error kind
pub type Result<T> = std::result::Result<T, ErrorKind>;

/// Invalid chunker configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk overlap ({overlap_chars}) must be smaller than chunk size ({max_chars})")]
    OverlapTooLarge {
        max_chars: usize,
        overlap_chars: usize,
    },
}

/// Failures of an embedding backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("embedding request timed out after {0:?}")]
    Timeout(Duration),

    #[error("embedding model not found: {0}")]
    ModelNotFound(String),

    #[error("embedding transport failure: {0}")]
    TransportFailure(String),

    #[error("embedding decode failure: {0}")]
    DecodeFailure(String),
}

/// Failures of a vector store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("vector dimension mismatch: store holds {expected}-d vectors, got {actual}-d")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vector store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("vector store unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a language model backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("generation request timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation model not found: {0}")]
    ModelNotFound(String),

    #[error("generation transport failure: {0}")]
    TransportFailure(String),

    #[error("generation decode failure: {0}")]
    DecodeFailure(String),
}

/// Invalid configuration value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Retrieval failures, carrying the collaborator error untouched
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Every error a pipeline run can end with
#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error(transparent)]
    Chunking(#[from] ChunkingError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("run cancelled")]
    Cancelled,
}

impl From<RetrievalError> for ErrorKind {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::Embedding(e) => ErrorKind::Embedding(e),
            RetrievalError::Store(e) => ErrorKind::Store(e),
        }
    }
}

/// Terminal error of a pipeline run
#[derive(Error, Debug)]
#[error("pipeline failed while {stage}: {source}")]
pub struct PipelineError {
    /// Stage the run was trying to reach
    pub stage: Stage,
    #[source]
    pub source: ErrorKind,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<ErrorKind>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.source, ErrorKind::Cancelled)
    }
}
