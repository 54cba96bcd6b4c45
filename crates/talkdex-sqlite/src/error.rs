//! Error types for SQLite storage

use thiserror::Error;

/// SQLite storage error type
#[derive(Error, Debug)]
pub enum SqliteError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema/migration error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Store was created for a different embedding dimension
    #[error("Store dimension is {stored}, configured dimension is {configured}")]
    StoreDimension { stored: usize, configured: usize },

    /// A segment embedding does not have the store dimension
    #[error("Segment {segment_id} has {actual} embedding dimensions, expected {expected}")]
    EmbeddingDimension {
        segment_id: String,
        expected: usize,
        actual: usize,
    },

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored data could not be decoded
    #[error("Corrupted row: {0}")]
    Corrupted(String),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations
pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<serde_json::Error> for SqliteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<SqliteError> for talkdex_core::storage::StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Connection(msg) => Self::Backend(msg),
            SqliteError::Schema(msg) => Self::Backend(msg),
            e @ SqliteError::StoreDimension { .. } => Self::Configuration(e.to_string()),
            e @ SqliteError::EmbeddingDimension { .. } => Self::InvalidOperation(e.to_string()),
            SqliteError::InvalidOperation(msg) => Self::InvalidOperation(msg),
            SqliteError::Serialization(msg) => Self::Serialization(msg),
            SqliteError::Corrupted(msg) => Self::CorruptedData(msg),
            SqliteError::Rusqlite(e) => Self::Backend(e.to_string()),
        }
    }
}
