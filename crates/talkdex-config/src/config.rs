//! Configuration sections
//!
//! Every field has a default so an absent or partial file still yields a
//! complete configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::credentials::resolve_api_key;
use crate::error::{ConfigError, ConfigResult};

/// Embedding provider type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    /// OpenAI-compatible `/embeddings` endpoint
    #[default]
    OpenAI,
    /// Ollama `/api/embed` endpoint
    Ollama,
    /// Deterministic offline provider for tests and dry runs
    Mock,
}

impl EmbeddingProviderType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }

    /// Default endpoint for this provider
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("https://api.openai.com/v1"),
            Self::Ollama => Some("http://localhost:11434"),
            Self::Mock => None,
        }
    }

    /// Default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => "text-embedding-3-small",
            Self::Ollama => "mxbai-embed-large",
            Self::Mock => "mock-embed",
        }
    }

    /// Whether this provider requires an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI)
    }
}

/// `[embedding]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider type (openai, ollama, mock)
    pub provider: EmbeddingProviderType,
    /// Model name (defaults to the provider's default model)
    pub model: Option<String>,
    /// Custom API endpoint
    pub api_url: Option<String>,
    /// API key; the environment takes precedence
    pub api_key: Option<String>,
    /// Fixed embedding dimension D
    pub dimensions: usize,
    /// Texts per provider batch request
    pub batch_size: usize,
    /// Inputs longer than this many characters are truncated
    pub max_input_chars: usize,
    /// Retries for rate-limited or failed requests
    pub max_retries: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::default(),
            model: None,
            api_url: None,
            api_key: None,
            dimensions: 1024,
            batch_size: 16,
            max_input_chars: 8192,
            max_retries: 3,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    /// Get the actual model name to use
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Get the API URL for remote providers
    pub fn endpoint(&self) -> Option<&str> {
        self.api_url
            .as_deref()
            .or_else(|| self.provider.default_endpoint())
    }

    /// API key from the environment or the config file
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_api_key(self.provider.as_str(), self.api_key.as_deref())
    }

    /// Offline mock configuration with the given dimension
    pub fn mock(dimensions: usize) -> Self {
        Self {
            provider: EmbeddingProviderType::Mock,
            dimensions,
            ..Self::default()
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.dimensions == 0 {
            return Err(ConfigError::Invalid(
                "embedding.dimensions must be greater than zero".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "embedding.batch_size must be greater than zero".into(),
            ));
        }
        if self.max_input_chars == 0 {
            return Err(ConfigError::Invalid(
                "embedding.max_input_chars must be greater than zero".into(),
            ));
        }
        if self.model_name().trim().is_empty() {
            return Err(ConfigError::Invalid("embedding.model must not be empty".into()));
        }
        if self.provider.requires_api_key() && self.resolved_api_key().is_none() {
            return Err(ConfigError::MissingCredential {
                provider: self.provider.as_str().to_string(),
            });
        }
        Ok(())
    }
}

/// `[enrichment]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Number of keywords kept per video
    pub max_keywords: usize,
    /// Shortest word considered a keyword
    pub min_keyword_len: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_keywords: 10,
            min_keyword_len: 4,
        }
    }
}

/// `[storage]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file
    pub path: PathBuf,
    /// Busy timeout in milliseconds
    pub busy_timeout_ms: u32,
    /// Page cache for the production profile, in KiB
    pub production_cache_kib: u32,
    /// Memory-mapped read window for the production profile, in bytes
    pub production_mmap_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./talkdex.db"),
            busy_timeout_ms: 5000,
            production_cache_kib: 65_536,
            production_mmap_bytes: 268_435_456,
        }
    }
}

/// `[pipeline]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Videos per storage commit
    pub batch_size: usize,
    /// Cap on discovered videos
    pub max_videos: Option<usize>,
    /// Skip this many discovered videos (resume cursor)
    pub start_at: usize,
    /// Skip videos whose stored transcript hash is unchanged
    pub skip_unchanged: bool,
    /// Run an integrity check after every commit
    pub verify_each_batch: bool,
    /// Merge consecutive transcript spans into windows of this many seconds
    pub merge_window_secs: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_videos: None,
            start_at: 0,
            skip_unchanged: false,
            verify_each_batch: false,
            merge_window_secs: None,
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.batch_size must be greater than zero".into(),
            ));
        }
        if let Some(window) = self.merge_window_secs {
            if !(window.is_finite() && window > 0.0) {
                return Err(ConfigError::Invalid(
                    "pipeline.merge_window_secs must be a positive number".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Complete talkdex configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TalkdexConfig {
    /// Embedding provider settings
    pub embedding: EmbeddingConfig,
    /// Enrichment settings
    pub enrichment: EnrichmentConfig,
    /// Storage settings
    pub storage: StorageConfig,
    /// Orchestrator settings
    pub pipeline: PipelineConfig,
}

impl TalkdexConfig {
    /// Check every section; call before processing any video
    pub fn validate(&self) -> ConfigResult<()> {
        self.embedding.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }

    /// Validate and additionally require that the database location is writable
    pub fn validate_for_ingest(&self) -> ConfigResult<()> {
        self.validate()?;
        ensure_output_writable(&self.storage.path)
    }
}

/// Check that `path`'s directory exists and accepts new files
pub fn ensure_output_writable(path: &Path) -> ConfigResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if !dir.is_dir() {
        return Err(ConfigError::OutputNotWritable {
            path: path.to_path_buf(),
            reason: format!("directory {} does not exist", dir.display()),
        });
    }

    tempfile::Builder::new()
        .prefix(".talkdex-probe")
        .tempfile_in(&dir)
        .map(drop)
        .map_err(|e| ConfigError::OutputNotWritable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TalkdexConfig::default();
        assert_eq!(config.embedding.dimensions, 1024);
        assert_eq!(config.embedding.batch_size, 16);
        assert_eq!(config.pipeline.batch_size, 10);
        assert_eq!(config.embedding.model_name(), "text-embedding-3-small");
        assert_eq!(config.embedding.endpoint(), Some("https://api.openai.com/v1"));
    }

    #[test]
    fn test_mock_config_needs_no_key() {
        let config = TalkdexConfig {
            embedding: EmbeddingConfig::mock(64),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.embedding.endpoint(), None);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = TalkdexConfig {
            embedding: EmbeddingConfig::mock(64),
            ..Default::default()
        };
        config.pipeline.batch_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_negative_merge_window_rejected() {
        let mut config = TalkdexConfig {
            embedding: EmbeddingConfig::mock(64),
            ..Default::default()
        };
        config.pipeline.merge_window_secs = Some(-3.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_in_missing_directory_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("does/not/exist/talkdex.db");
        assert!(matches!(
            ensure_output_writable(&path),
            Err(ConfigError::OutputNotWritable { .. })
        ));
    }

    #[test]
    fn test_output_in_existing_directory_accepted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("talkdex.db");
        assert!(ensure_output_writable(&path).is_ok());
    }
}
