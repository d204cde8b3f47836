//! TOML configuration parsing and startup validation.
//!
//! Configuration is loaded once, validated, and passed into each
//! component at construction. Nothing reads ambient process state after
//! load, so tests can run the pipeline with varied thresholds
//! deterministically. Out-of-range values are fatal at load time, not
//! recoverable per-call.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Collection name within the external store.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Embedding dimensionality the store is configured with.
    pub dims: usize,
}

fn default_collection() -> String {
    "laqs".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// `"ollama"` or `"disabled"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            host: default_host(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_host() -> String {
    "http://localhost:11434".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Result count for plain search.
    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,
    /// Result count when retrieving context for answer generation.
    #[serde(default = "default_context_top_k")]
    pub context_top_k: usize,
    /// Relevance floor as a percentage in `[0, 100]`. The percentage
    /// representation is held end to end; fraction-style values are
    /// rejected, not rescaled.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_top_k: default_search_top_k(),
            context_top_k: default_context_top_k(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

fn default_search_top_k() -> usize {
    10
}
fn default_context_top_k() -> usize {
    5
}
fn default_similarity_threshold() -> f64 {
    30.0
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Configuration(format!("failed to read config file {}: {e}", path.display()))
    })?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| Error::Configuration(format!("failed to parse config file: {e}")))?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.store.dims == 0 {
        return Err(Error::Configuration("store.dims must be > 0".into()));
    }

    if config.retrieval.search_top_k < 1 {
        return Err(Error::Configuration(
            "retrieval.search_top_k must be >= 1".into(),
        ));
    }

    if config.retrieval.context_top_k < 1 {
        return Err(Error::Configuration(
            "retrieval.context_top_k must be >= 1".into(),
        ));
    }

    if !(0.0..=100.0).contains(&config.retrieval.similarity_threshold) {
        return Err(Error::Configuration(
            "retrieval.similarity_threshold must be a percentage in [0, 100]".into(),
        ));
    }

    match config.embedding.provider.as_str() {
        "disabled" => {}
        "ollama" => {
            if config.embedding.model.is_none() {
                return Err(Error::Configuration(
                    "embedding.model must be specified when provider is 'ollama'".into(),
                ));
            }
        }
        other => {
            return Err(Error::Configuration(format!(
                "unknown embedding provider: '{other}'. Must be ollama or disabled."
            )))
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_str).expect("parse");
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = parse("[store]\ndims = 768\n").unwrap();
        assert_eq!(config.store.collection, "laqs");
        assert_eq!(config.retrieval.search_top_k, 10);
        assert_eq!(config.retrieval.context_top_k, 5);
        assert!((config.retrieval.similarity_threshold - 30.0).abs() < 1e-9);
        assert!(!config.embedding.is_enabled());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let err =
            parse("[store]\ndims = 768\n\n[retrieval]\nsimilarity_threshold = 101.0\n").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err =
            parse("[store]\ndims = 768\n\n[retrieval]\nsimilarity_threshold = -0.5\n").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_zero_dims_rejected() {
        assert!(parse("[store]\ndims = 0\n").is_err());
    }

    #[test]
    fn test_ollama_requires_model() {
        let err = parse("[store]\ndims = 768\n\n[embedding]\nprovider = \"ollama\"\n").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let config = parse(
            "[store]\ndims = 768\n\n[embedding]\nprovider = \"ollama\"\nmodel = \"nomic-embed-text\"\n",
        )
        .unwrap();
        assert!(config.embedding.is_enabled());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(parse("[store]\ndims = 768\n\n[embedding]\nprovider = \"openai\"\n").is_err());
    }
}
