//! Ingestion error taxonomy
//!
//! - `InvalidInput`: caller handed a pure component unusable input
//! - `ProcessingFailure`: a remote dependency failed; absorbed per item or per video
//! - `IntegrityFailure`: post-commit verification failed; fatal
//! - `ConfigurationFailure`: setup problem detected before any video is processed; fatal
//! - `Storage`: a batch commit failed; fatal to the run

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::storage::StorageError;

#[derive(Error, Debug, Clone)]
pub enum IngestError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Processing failure: {0}")]
    ProcessingFailure(String),

    #[error("Integrity check failed: {}", .0.join("; "))]
    IntegrityFailure(Vec<String>),

    #[error("Configuration failure: {0}")]
    ConfigurationFailure(String),

    #[error("Storage commit failed: {0}")]
    Storage(#[from] StorageError),
}

impl IngestError {
    /// Whether the run must stop
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::IntegrityFailure(_) | Self::ConfigurationFailure(_) | Self::Storage(_)
        )
    }
}

impl From<EmbeddingError> for IngestError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::InvalidInput(msg) => Self::InvalidInput(msg),
            EmbeddingError::DimensionMismatch { expected, actual } => Self::InvalidInput(format!(
                "dimension mismatch: expected {}, got {}",
                expected, actual
            )),
            EmbeddingError::ConfigError(msg) => Self::ConfigurationFailure(msg),
            other => Self::ProcessingFailure(other.to_string()),
        }
    }
}

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Why a video was left out of its batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Discovery reported no transcript
    NoTranscript,
    /// Transcript present but produced zero segments
    EmptyTranscript,
    /// Transcript retrieval failed
    TranscriptError,
    EnrichmentError,
    EmbeddingError,
    /// Stored transcript hash matches; nothing to do
    Unchanged,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoTranscript => "no_transcript",
            Self::EmptyTranscript => "empty_transcript",
            Self::TranscriptError => "transcript_error",
            Self::EnrichmentError => "enrichment_error",
            Self::EmbeddingError => "embedding_error",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
