//! Ollama configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use docrag_core::config::parse_var;
use docrag_core::{ConfigError, GenerationConfig};

/// Configuration for the Ollama clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL, e.g. `http://localhost:11434`
    pub host: String,
    pub embedding_model: String,
    pub llm_model: String,
    /// Deadline applied to every HTTP request
    pub request_timeout: Duration,
    /// Embedding requests allowed in flight during a batch; 1 is sequential
    pub max_concurrency: usize,
    pub generation: GenerationConfig,
}

impl OllamaConfig {
    pub const DEFAULT_HOST: &'static str = "http://localhost:11434";
    pub const DEFAULT_EMBEDDING_MODEL: &'static str = "nomic-embed-text";
    pub const DEFAULT_LLM_MODEL: &'static str = "mistral";
    pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("OLLAMA_HOST") {
            config.host = host;
        }
        if let Some(model) = lookup("DOCRAG_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Some(model) = lookup("DOCRAG_LLM_MODEL") {
            config.llm_model = model;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "DOCRAG_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = parse_var::<usize, _>(&lookup, "DOCRAG_EMBED_CONCURRENCY")? {
            config.max_concurrency = limit;
        }
        if let Some(temperature) = parse_var::<f32, _>(&lookup, "DOCRAG_TEMPERATURE")? {
            config.generation.temperature = Some(temperature);
        }

        config.validate()?;
        Ok(config)
    }

    /// Create configuration with explicit models and default transport settings
    pub fn new(host: impl Into<String>, embedding_model: impl Into<String>, llm_model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            embedding_model: embedding_model.into(),
            llm_model: llm_model.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.host)
            .map_err(|e| ConfigError::new(format!("invalid Ollama host {:?}: {}", self.host, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::new(format!(
                "Ollama host must be an http(s) URL, got {:?}",
                self.host
            )));
        }
        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::new("embedding model name is empty"));
        }
        if self.llm_model.trim().is_empty() {
            return Err(ConfigError::new("language model name is empty"));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::new("embedding concurrency must be at least 1"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::new("request timeout must be non-zero"));
        }
        Ok(())
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            embedding_model: Self::DEFAULT_EMBEDDING_MODEL.to_string(),
            llm_model: Self::DEFAULT_LLM_MODEL.to_string(),
            request_timeout: Duration::from_secs(60),
            max_concurrency: Self::DEFAULT_MAX_CONCURRENCY,
            generation: GenerationConfig::default(),
        }
    }
}
