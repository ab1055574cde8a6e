//! Configuration for the GxP assistant.
//!
//! [`RagConfig`] carries every tunable of the ingestion and query paths. It
//! is normally loaded with [`RagConfig::from_env`], which reads an optional
//! `.env` file and then the process environment; programmatic callers use
//! [`RagConfig::builder`].

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RagError, Result};

/// Configuration parameters for the assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Credential for the embedding and generation services.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API.
    pub api_base_url: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Length of the vectors produced by `embedding_model`.
    pub embedding_dimensions: usize,
    /// Chat model used to generate answers.
    pub generation_model: String,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of passages retrieved per query.
    pub top_k: usize,
    /// Sampling temperature for generation.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Directory scanned for PDF documents.
    pub data_dir: PathBuf,
    /// Directory holding the persistent vector index.
    pub index_dir: PathBuf,
    /// Directory for log files.
    pub logs_dir: PathBuf,
    /// Name of the vector index collection.
    pub collection_name: String,
    /// Pause after every this many chunks during ingestion.
    pub ingest_pause_every: usize,
    /// Length of the ingestion pause in milliseconds.
    pub ingest_pause_ms: u64,
    /// Title shown by the console.
    pub app_title: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            embedding_dimensions: 1536,
            generation_model: "gpt-3.5-turbo".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            temperature: 0.3,
            max_tokens: 2048,
            data_dir: PathBuf::from("Data"),
            index_dir: PathBuf::from("vector_db_openai"),
            logs_dir: PathBuf::from("logs"),
            collection_name: "gxp_documents_openai".to_string(),
            ingest_pause_every: 10,
            ingest_pause_ms: 500,
            app_title: "GxP Validation Assistant".to_string(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Load configuration from `.env` (if present) and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a variable cannot be parsed or the
    /// resulting values are inconsistent.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();
        let config = &mut builder.config;

        if let Some(key) = lookup("OPENAI_API_KEY") {
            config.api_key = key;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            config.api_base_url = url;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Some(model) = lookup("GENERATION_MODEL") {
            config.generation_model = model;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            config.data_dir = dir.into();
        }
        if let Some(dir) = lookup("VECTOR_DB_DIR") {
            config.index_dir = dir.into();
        }
        if let Some(dir) = lookup("LOGS_DIR") {
            config.logs_dir = dir.into();
        }
        if let Some(name) = lookup("COLLECTION_NAME") {
            config.collection_name = name;
        }
        if let Some(title) = lookup("APP_TITLE") {
            config.app_title = title;
        }

        parse_into(&lookup, "EMBEDDING_DIMENSIONS", &mut config.embedding_dimensions)?;
        parse_into(&lookup, "CHUNK_SIZE", &mut config.chunk_size)?;
        parse_into(&lookup, "CHUNK_OVERLAP", &mut config.chunk_overlap)?;
        parse_into(&lookup, "TOP_K", &mut config.top_k)?;
        parse_into(&lookup, "TEMPERATURE", &mut config.temperature)?;
        parse_into(&lookup, "MAX_TOKENS", &mut config.max_tokens)?;
        parse_into(&lookup, "INGEST_PAUSE_EVERY", &mut config.ingest_pause_every)?;
        parse_into(&lookup, "INGEST_PAUSE_MS", &mut config.ingest_pause_ms)?;

        builder.build()
    }

    /// Check that the configuration is usable against the live services and
    /// create the index and log directories.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the API key is missing, or
    /// [`RagError::Io`] if a directory cannot be created.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(RagError::ConfigError(
                "OPENAI_API_KEY not found in environment variables".to_string(),
            ));
        }
        std::fs::create_dir_all(&self.index_dir)?;
        std::fs::create_dir_all(&self.logs_dir)?;
        Ok(())
    }

    /// The pause applied during ingestion.
    pub fn ingest_pause(&self) -> Duration {
        Duration::from_millis(self.ingest_pause_ms)
    }
}

fn parse_into<T, F>(lookup: &F, name: &str, slot: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        *slot = raw.trim().parse().map_err(|e| {
            RagError::ConfigError(format!("{name} has invalid value '{raw}': {e}"))
        })?;
    }
    Ok(())
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API base URL.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    /// Set the embedding model and its vector length.
    pub fn embedding_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.config.embedding_model = model.into();
        self.config.embedding_dimensions = dimensions;
        self
    }

    /// Set the generation model.
    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.config.generation_model = model.into();
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of passages retrieved per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the generated token limit.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the document directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Set the vector index directory.
    pub fn index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.index_dir = dir.into();
        self
    }

    /// Set the log directory.
    pub fn logs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.logs_dir = dir.into();
        self
    }

    /// Set the collection name.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.config.collection_name = name.into();
        self
    }

    /// Pause for `pause_ms` milliseconds after every `every` chunks during ingestion.
    pub fn ingest_throttle(mut self, every: usize, pause_ms: u64) -> Self {
        self.config.ingest_pause_every = every;
        self.config.ingest_pause_ms = pause_ms;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// The API key is not required here; see [`RagConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `temperature` is outside `0.0..=2.0`
    /// - `max_tokens == 0`, `embedding_dimensions == 0` or `ingest_pause_every == 0`
    pub fn build(self) -> Result<RagConfig> {
        let config = self.config;
        if config.chunk_overlap >= config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if !(0.0..=2.0).contains(&config.temperature) {
            return Err(RagError::ConfigError(format!(
                "temperature ({}) must be between 0.0 and 2.0",
                config.temperature
            )));
        }
        if config.max_tokens == 0 {
            return Err(RagError::ConfigError("max_tokens must be greater than zero".to_string()));
        }
        if config.embedding_dimensions == 0 {
            return Err(RagError::ConfigError(
                "embedding_dimensions must be greater than zero".to_string(),
            ));
        }
        if config.ingest_pause_every == 0 {
            return Err(RagError::ConfigError(
                "ingest_pause_every must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = RagConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, RagConfig::default());
        assert_eq!(config.ingest_pause(), Duration::from_millis(500));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = RagConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CHUNK_SIZE", "800"),
            ("CHUNK_OVERLAP", "100"),
            ("TOP_K", " 3 "),
            ("TEMPERATURE", "0.7"),
            ("VECTOR_DB_DIR", "/tmp/index"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.top_k, 3);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.index_dir, PathBuf::from("/tmp/index"));
    }

    #[test]
    fn unparseable_number_is_a_config_error() {
        let err = RagConfig::from_lookup(lookup_from(&[("TOP_K", "five")])).unwrap_err();
        assert!(matches!(err, RagError::ConfigError(ref msg) if msg.contains("TOP_K")));
    }

    #[test]
    fn inconsistent_values_are_rejected() {
        assert!(RagConfig::builder().chunk_size(100).chunk_overlap(100).build().is_err());
        assert!(RagConfig::builder().top_k(0).build().is_err());
        assert!(RagConfig::builder().temperature(2.5).build().is_err());
        assert!(RagConfig::builder().max_tokens(0).build().is_err());
        assert!(RagConfig::builder().ingest_throttle(0, 500).build().is_err());
    }

    #[test]
    fn validate_requires_api_key() {
        let config = RagConfig::default();
        assert!(matches!(config.validate(), Err(RagError::ConfigError(_))));
    }

    #[test]
    fn api_key_is_not_serialized() {
        let config = RagConfig::builder().api_key("sk-secret").build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
