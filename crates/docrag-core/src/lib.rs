//! Core traits and types for docrag
//!
//! This crate defines the data model, the error taxonomy and the capability
//! traits (`EmbeddingClient`, `VectorStore`, `LanguageModel`) that the
//! pipeline composes. Concrete backends live in sibling crates, which keeps
//! the pipeline testable against in-process fakes.

pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod types;
pub mod vector_store;

#[cfg(test)]
mod tests;

pub use embedding::EmbeddingClient;
pub use error::{
    ChunkingError, ConfigError, EmbeddingError, ErrorKind, GenerationError, PipelineError,
    Result, RetrievalError, StoreError,
};
pub use llm::{GenerationConfig, LanguageModel};
pub use prompt::{CONTEXT_SEPARATOR, CONTEXT_SLOT, DEFAULT_PROMPT_TEMPLATE, QUESTION_SLOT};
pub use types::*;
pub use vector_store::VectorStore;
