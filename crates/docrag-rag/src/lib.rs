//! Retrieval-augmented generation over a single document
//!
//! This crate provides the chunker, the vector stores, the retriever, the
//! prompt assembler and the pipeline that drives them.

pub mod chunker;
pub mod config;
pub mod deadline;
pub mod hash_embedder;
pub mod pipeline;
pub mod prompt;
pub mod qdrant;
pub mod retriever;
pub mod vector_store;


pub use chunker::{Chunker, split};
pub use config::{ChunkingConfig, PipelineConfig, Scheme, StoreConfig};
pub use hash_embedder::{DEFAULT_HASH_DIMENSION, HashEmbedder};
pub use pipeline::{DynPipeline, Pipeline};
pub use prompt::{PromptAssembler, assemble};
pub use qdrant::QdrantVectorStore;
pub use retriever::Retriever;
pub use vector_store::{InMemoryVectorStore, cosine_similarity};

// Re-export core types for convenience
pub use docrag_core::{
    Answer, Chunk, ChunkingError, Document, EmbeddingClient, EmbeddingError, ErrorKind,
    GenerationError, IndexedPassage, LanguageModel, PipelineError, RetrievalError,
    RetrievedPassage, Stage, StoreError, VectorStore,
};
