//! Pipeline and vector store configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use docrag_core::config::parse_var;
use docrag_core::{ConfigError, DEFAULT_PROMPT_TEMPLATE};

/// Chunk sizing, measured in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 512,
            overlap_chars: 100,
        }
    }
}

/// Settings for one pipeline instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub chunking: ChunkingConfig,
    /// Passages retrieved per question
    pub top_k: usize,
    pub prompt_template: String,
    /// Deadline for every embedding, store and generation call
    pub call_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            top_k: 3,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            call_timeout: Duration::from_secs(120),
        }
    }
}

impl PipelineConfig {
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

        if let Some(size) = parse_var::<usize, _>(&lookup, "DOCRAG_CHUNK_SIZE")? {
            config.chunking.max_chars = size;
        }
        if let Some(overlap) = parse_var::<usize, _>(&lookup, "DOCRAG_CHUNK_OVERLAP")? {
            config.chunking.overlap_chars = overlap;
        }
        if let Some(top_k) = parse_var::<usize, _>(&lookup, "DOCRAG_TOP_K")? {
            config.top_k = top_k;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "DOCRAG_CALL_TIMEOUT_SECS")? {
            config.call_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::new("DOCRAG_TOP_K must be at least 1"));
        }
        if self.call_timeout.is_zero() {
            return Err(ConfigError::new("DOCRAG_CALL_TIMEOUT_SECS must be at least 1"));
        }
        Ok(())
    }

    pub fn with_chunking(mut self, max_chars: usize, overlap_chars: usize) -> Self {
        self.chunking = ChunkingConfig {
            max_chars,
            overlap_chars,
        };
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Transport scheme of the vector store service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl FromStr for Scheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(ConfigError::new(format!(
                "unsupported store scheme {other:?}, expected http or https"
            ))),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => f.write_str("http"),
            Scheme::Https => f.write_str("https"),
        }
    }
}

/// Location of a remote vector index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub index_name: String,
    pub scheme: Scheme,
    /// `host:port`
    pub host: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_name: "Docs".to_string(),
            scheme: Scheme::Http,
            host: "localhost:6334".to_string(),
        }
    }
}

impl StoreConfig {
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

        if let Some(index_name) = lookup("DOCRAG_INDEX_NAME") {
            config.index_name = index_name;
        }
        if let Some(scheme) = lookup("DOCRAG_STORE_SCHEME") {
            config.scheme = scheme.parse()?;
        }
        if let Some(host) = lookup("DOCRAG_STORE_HOST") {
            config.host = host;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index_name.trim().is_empty() {
            return Err(ConfigError::new("index name is empty"));
        }
        if self.host.contains("://") {
            return Err(ConfigError::new(format!(
                "store host {:?} must be host:port without a scheme",
                self.host
            )));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::new("store host is empty"));
        }
        Ok(())
    }

    pub fn url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.chunking, ChunkingConfig::default());
        assert_eq!(config.top_k, 3);
        assert_eq!(config.prompt_template, DEFAULT_PROMPT_TEMPLATE);
        assert_eq!(config.call_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_pipeline_overrides() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("DOCRAG_CHUNK_SIZE", "500"),
            ("DOCRAG_CHUNK_OVERLAP", "50"),
            ("DOCRAG_TOP_K", "5"),
            ("DOCRAG_CALL_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.chunking.max_chars, 500);
        assert_eq!(config.chunking.overlap_chars, 50);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.call_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_pipeline_rejects_zero_top_k() {
        assert!(PipelineConfig::from_lookup(lookup_from(&[("DOCRAG_TOP_K", "0")])).is_err());
    }

    #[test]
    fn test_pipeline_rejects_zero_call_timeout() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("DOCRAG_CALL_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("DOCRAG_CALL_TIMEOUT_SECS"));

        let config = PipelineConfig::from_lookup(lookup_from(&[("DOCRAG_CALL_TIMEOUT_SECS", "1")])).unwrap();
        assert_eq!(config.call_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_validate_builder_settings() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(PipelineConfig::default().with_top_k(0).validate().is_err());
        assert!(PipelineConfig::default().with_call_timeout(Duration::ZERO).validate().is_err());
    }

    #[test]
    fn test_store_config_url() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("DOCRAG_INDEX_NAME", "Wonderland"),
            ("DOCRAG_STORE_SCHEME", "HTTPS"),
            ("DOCRAG_STORE_HOST", "qdrant.internal:6334"),
        ]))
        .unwrap();

        assert_eq!(config.index_name, "Wonderland");
        assert_eq!(config.scheme, Scheme::Https);
        assert_eq!(config.url(), "https://qdrant.internal:6334");
    }

    #[test]
    fn test_store_config_rejects_scheme_in_host() {
        let err = StoreConfig::from_lookup(lookup_from(&[(
            "DOCRAG_STORE_HOST",
            "http://localhost:6334",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("without a scheme"));
    }

    #[test]
    fn test_unknown_scheme() {
        assert!("grpc".parse::<Scheme>().is_err());
        assert_eq!("http".parse::<Scheme>().unwrap(), Scheme::Http);
    }
}
