//! Embedding vector type and provider trait
//!
//! The provider trait lives here so that enrichment and pipeline code depend on
//! the abstraction; concrete providers live in `talkdex-llm`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while generating or comparing embeddings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    /// Caller supplied unusable input (blank text, empty vector)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two vectors of different lengths were compared
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The remote model failed or returned unusable data
    #[error("Embedding generation failed: {0}")]
    ProcessingFailure(String),

    /// HTTP-level failure talking to the provider
    #[error("HTTP error ({status}): {body}")]
    Http { status: u16, body: String },

    /// Transport failure (connect, timeout, decode)
    #[error("Request error: {0}")]
    Request(String),

    /// Provider returned a payload that could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider misconfiguration (missing key, bad endpoint)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl EmbeddingError {
    /// Whether this error came from the remote dependency rather than the caller
    pub fn is_processing_failure(&self) -> bool {
        matches!(
            self,
            Self::ProcessingFailure(_) | Self::Http { .. } | Self::Request(_) | Self::InvalidResponse(_)
        )
    }

    /// Whether a retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Request(_) => true,
            _ => false,
        }
    }
}

/// Result type for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Ordered sequence of `f32` components
///
/// Comparable only with vectors of the same length. The empty vector means
/// "not yet generated"; the zero vector of the store dimension is the
/// failure fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(components: Vec<f32>) -> Self {
        Self(components)
    }

    /// The fallback vector of length `dimensions`
    pub fn zeros(dimensions: usize) -> Self {
        Self(vec![0.0; dimensions])
    }

    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every component is exactly zero (vacuously true for empty)
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    /// True when no component is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Euclidean norm
    pub fn norm(&self) -> f32 {
        self.0.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Little-endian `f32` encoding, `4 * dimensions` bytes
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() * 4);
        for value in &self.0 {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Decode the little-endian encoding produced by [`Self::to_le_bytes`]
    pub fn from_le_bytes(bytes: &[u8]) -> EmbeddingResult<Self> {
        if bytes.len() % 4 != 0 {
            return Err(EmbeddingError::InvalidInput(format!(
                "embedding blob length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        let components = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(Self(components))
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(components: Vec<f32>) -> Self {
        Self(components)
    }
}

impl AsRef<[f32]> for EmbeddingVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Response from a single embedding generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,

    /// Model that produced the vector
    pub model: String,

    /// Token usage reported by the provider, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<usize>,
}

impl EmbeddingResponse {
    pub fn new(embedding: Vec<f32>, model: impl Into<String>) -> Self {
        Self {
            embedding,
            model: model.into(),
            tokens: None,
        }
    }

    /// Builder-style: set token usage
    #[must_use]
    pub fn with_tokens(mut self, tokens: usize) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}

/// Remote (or local) text embedding model
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text
    async fn embed(&self, text: &str) -> EmbeddingResult<EmbeddingResponse>;

    /// Embed several texts in one request where the provider supports it
    ///
    /// On success the output has one response per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<EmbeddingResponse>> {
        let mut responses = Vec::with_capacity(texts.len());
        for text in texts {
            responses.push(self.embed(text).await?);
        }
        Ok(responses)
    }

    /// Dimension of the vectors this provider returns
    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;

    /// Short provider identifier ("openai", "ollama", "mock")
    fn provider_name(&self) -> &str;
}
