//! Shared HTTP transport for the Ollama endpoints

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;

use docrag_core::ConfigError;

use crate::config::OllamaConfig;

/// Why a single Ollama call failed, before mapping to a collaborator error
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CallFailure {
    Timeout(Duration),
    /// HTTP 404, which Ollama returns for an unknown model
    NotFound(String),
    Status { status: u16, body: String },
    Transport(String),
    Decode(String),
}

impl CallFailure {
    pub(crate) fn describe(&self) -> String {
        match self {
            CallFailure::Timeout(limit) => format!("no response within {:?}", limit),
            CallFailure::NotFound(body) => format!("HTTP 404: {}", body),
            CallFailure::Status { status, body } => format!("HTTP {}: {}", status, body),
            CallFailure::Transport(message) | CallFailure::Decode(message) => message.clone(),
        }
    }
}

/// Thin JSON-over-HTTP client bound to one Ollama host
#[derive(Clone)]
pub(crate) struct OllamaHttp {
    client: Client,
    host: String,
    request_timeout: Duration,
}

impl OllamaHttp {
    pub(crate) fn new(config: &OllamaConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let client = Client::builder()
            .build()
            .map_err(|e| ConfigError::new(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// POST `body` as JSON and decode a JSON reply.
    ///
    /// Only HTTP 200 counts as success; any other status carries the response
    /// body back as diagnostic text. The whole exchange, body included, runs
    /// under the request deadline.
    pub(crate) async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, CallFailure>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned + Send,
    {
        let url = self.endpoint(path);

        let exchange = async {
            let response = self
                .client
                .post(&url)
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await
                .map_err(|e| CallFailure::Transport(e.to_string()))?;

            let status = response.status();
            if status != StatusCode::OK {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<body unavailable>".to_string());
                if status == StatusCode::NOT_FOUND {
                    return Err(CallFailure::NotFound(error_text));
                }
                return Err(CallFailure::Status {
                    status: status.as_u16(),
                    body: error_text,
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| CallFailure::Transport(e.to_string()))?;
            serde_json::from_slice::<R>(&bytes).map_err(|e| CallFailure::Decode(e.to_string()))
        };

        match timeout(self.request_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(CallFailure::Timeout(self.request_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = OllamaConfig::new("http://localhost:11434/", "nomic-embed-text", "mistral");
        let http = OllamaHttp::new(&config).unwrap();
        assert_eq!(
            http.endpoint("/api/embeddings"),
            "http://localhost:11434/api/embeddings"
        );
    }

    #[test]
    fn test_describe_status_failure() {
        let failure = CallFailure::Status {
            status: 500,
            body: "out of memory".to_string(),
        };
        assert_eq!(failure.describe(), "HTTP 500: out of memory");
    }
}
