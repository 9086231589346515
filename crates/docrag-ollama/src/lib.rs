//! Ollama integration for docrag
//!
//! This crate provides the Ollama implementations of the `EmbeddingClient`
//! and `LanguageModel` traits.

mod client;
mod config;
mod embedder;
mod generator;


pub use config::OllamaConfig;
pub use embedder::OllamaEmbedder;
pub use generator::OllamaGenerator;

// Re-export core types for convenience
pub use docrag_core::{
    ConfigError, EmbeddingClient, EmbeddingError, GenerationConfig, GenerationError,
    LanguageModel,
};
