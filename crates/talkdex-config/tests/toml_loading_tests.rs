//! Loading configuration from TOML files

use std::io::Write;
use talkdex_config::{ConfigError, ConfigLoader, EmbeddingProviderType};
use tempfile::NamedTempFile;

#[test]
fn test_partial_file_fills_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[embedding]
provider = "ollama"
model = "mxbai-embed-large"

[pipeline]
batch_size = 3
"#
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(file.path()).unwrap();
    assert_eq!(config.embedding.provider, EmbeddingProviderType::Ollama);
    assert_eq!(config.embedding.model_name(), "mxbai-embed-large");
    assert_eq!(config.embedding.endpoint(), Some("http://localhost:11434"));
    assert_eq!(config.embedding.dimensions, 1024);
    assert_eq!(config.pipeline.batch_size, 3);
    assert_eq!(config.enrichment.max_keywords, 10);
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_file_is_default() {
    let file = NamedTempFile::new().unwrap();
    let config = ConfigLoader::load_from_file(file.path()).unwrap();
    assert_eq!(config.pipeline.batch_size, 10);
    assert_eq!(config.embedding.provider, EmbeddingProviderType::OpenAI);
}

#[test]
fn test_malformed_file_reports_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[pipeline\nbatch_size = ").unwrap();

    let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = ConfigLoader::load_or_default(Some(&missing)).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_unknown_provider_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[embedding]\nprovider = \"carrier-pigeon\"").unwrap();
    assert!(ConfigLoader::load_from_file(file.path()).is_err());
}
