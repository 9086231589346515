//! Language model trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Sampling options forwarded to the model backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    /// Upper bound on generated tokens
    pub max_tokens: Option<u32>,
    pub stop_sequences: Vec<String>,
}

impl GenerationConfig {
    /// True when no option deviates from the backend defaults
    pub fn is_default(&self) -> bool {
        self == &GenerationConfig::default()
    }
}

/// Trait for language model backends
///
/// A single free-form completion: the assembled prompt goes in, the
/// completion text comes out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt`
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Name of the model answering
    fn model_name(&self) -> &str;
}
