//! Embedding provider abstraction for semantic search and vector operations
//!
//! This module provides the concrete providers behind
//! [`talkdex_core::EmbeddingProvider`] and the generator that wraps them with
//! validation, truncation and zero-vector fallback.

/// Batch-aware generator with validation and similarity scoring.
pub mod generator;

/// Shared HTTP request/retry plumbing.
pub mod http;

/// Mock provider for testing
pub mod mock;

/// Ollama provider implementation.
pub mod ollama;

/// OpenAI-compatible provider implementation.
pub mod openai;

pub use generator::{cosine_similarity, truncate_chars, BatchEmbeddings, EmbeddingGenerator};
pub use http::RetryPolicy;
pub use mock::MockEmbeddingProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use talkdex_config::{EmbeddingConfig, EmbeddingProviderType};
pub use talkdex_core::embedding::{
    EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult, EmbeddingVector,
};

use std::sync::Arc;
use tracing::info;

/// Create an embedding provider from configuration
pub fn create_provider(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn EmbeddingProvider>> {
    info!(
        provider = config.provider.as_str(),
        model = config.model_name(),
        dimensions = config.dimensions,
        "Creating embedding provider"
    );

    match config.provider {
        EmbeddingProviderType::OpenAI => Ok(Arc::new(OpenAIProvider::from_config(config)?)),
        EmbeddingProviderType::Ollama => Ok(Arc::new(OllamaProvider::from_config(config)?)),
        EmbeddingProviderType::Mock => Ok(Arc::new(
            MockEmbeddingProvider::with_dimensions(config.dimensions).with_model(config.model_name()),
        )),
    }
}

/// Build a generator for the configured provider
pub fn create_generator(config: &EmbeddingConfig) -> EmbeddingResult<EmbeddingGenerator> {
    let provider = create_provider(config)?;
    Ok(EmbeddingGenerator::new(provider, config.dimensions)
        .with_max_input_chars(config.max_input_chars)
        .with_batch_size(config.batch_size))
}
