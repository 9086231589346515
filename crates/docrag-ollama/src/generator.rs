//! Ollama completion client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docrag_core::{ConfigError, GenerationConfig, GenerationError, LanguageModel};

use crate::client::{CallFailure, OllamaHttp};
use crate::config::OllamaConfig;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Serialize)]
struct GenerateOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "no_stop_sequences")]
    stop: &'a [String],
}

fn no_stop_sequences(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Non-streaming completion client for a single Ollama model
#[derive(Clone)]
pub struct OllamaGenerator {
    http: OllamaHttp,
    model: String,
    generation: GenerationConfig,
}

impl OllamaGenerator {
    /// Create a new generator from configuration
    pub fn new(config: &OllamaConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: OllamaHttp::new(config)?,
            model: config.llm_model.clone(),
            generation: config.generation.clone(),
        })
    }

    /// Create a new generator from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = OllamaConfig::from_env()?;
        Self::new(&config)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    fn options(&self) -> Option<GenerateOptions<'_>> {
        if self.generation.is_default() {
            return None;
        }
        Some(GenerateOptions {
            temperature: self.generation.temperature,
            top_p: self.generation.top_p,
            top_k: self.generation.top_k,
            num_predict: self.generation.max_tokens,
            stop: &self.generation.stop_sequences,
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: self.options(),
        };

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "requesting completion");

        let response: GenerateResponse = self
            .http
            .post_json(GENERATE_PATH, &request)
            .await
            .map_err(|failure| match failure {
                CallFailure::Timeout(limit) => GenerationError::Timeout(limit),
                CallFailure::NotFound(_) => GenerationError::ModelNotFound(self.model.clone()),
                CallFailure::Decode(message) => GenerationError::DecodeFailure(message),
                other => GenerationError::TransportFailure(format!(
                    "generation request failed: {}",
                    other.describe()
                )),
            })?;

        Ok(response.response.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
