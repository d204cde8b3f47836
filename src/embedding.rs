//! Embedding-provider collaborator.
//!
//! The crate never generates vectors itself; query text is handed to an
//! external provider. [`EmbeddingProvider`] is the seam, with two
//! implementations:
//!
//! - [`OllamaProvider`] calls a local Ollama instance's
//!   `POST /api/embeddings` endpoint.
//! - [`DisabledProvider`] always errors; used for validation-only
//!   deployments where no query embedding is ever needed.
//!
//! There is no retry policy here: a failed embedding call is reported
//! once. Repeated silent retries could mask a persistently unreachable
//! provider.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Text-to-vector conversion for query strings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier (e.g. `"nomic-embed-text"`).
    fn model_name(&self) -> &str;

    /// Embed a single query text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// A no-op provider that always returns errors.
///
/// Used when `embedding.provider = "disabled"`: validation, stats, and
/// dedupe operations never embed anything, so they run fine without a
/// live provider.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::RetrievalUnavailable(
            "embedding provider is disabled".into(),
        ))
    }
}

/// Embedding provider backed by a local Ollama instance.
pub struct OllamaProvider {
    model: String,
    host: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| Error::Configuration("embedding.model required for Ollama".into()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            model,
            host: config.host.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": text,
        });

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.host))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::RetrievalUnavailable(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Error::RetrievalUnavailable(format!(
                "embedding provider returned {status}: {body_text}"
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            Error::RetrievalUnavailable(format!("invalid embedding response: {e}"))
        })?;

        parse_ollama_response(&json)
    }
}

/// Extract the `embedding` array from an Ollama response body.
fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let values = json
        .get("embedding")
        .and_then(|e| e.as_array())
        .ok_or_else(|| {
            Error::RetrievalUnavailable("invalid embedding response: missing embedding".into())
        })?;

    Ok(values
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect())
}

/// Create the provider named by the configuration.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "ollama" => Ok(Box::new(OllamaProvider::new(config)?)),
        other => Err(Error::Configuration(format!(
            "unknown embedding provider: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ollama_response() {
        let json = serde_json::json!({ "embedding": [0.25, -1.5, 3.0] });
        assert_eq!(parse_ollama_response(&json).unwrap(), vec![0.25, -1.5, 3.0]);
    }

    #[test]
    fn test_parse_ollama_response_missing_field() {
        let json = serde_json::json!({ "data": [] });
        assert!(matches!(
            parse_ollama_response(&json),
            Err(Error::RetrievalUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_disabled_provider_errors() {
        let err = DisabledProvider.embed("anything").await.unwrap_err();
        assert!(matches!(err, Error::RetrievalUnavailable(_)));
    }

    #[test]
    fn test_create_provider_dispatch() {
        let config = EmbeddingConfig::default();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "disabled");
    }
}
