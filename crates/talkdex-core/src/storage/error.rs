//! Errors surfaced by a [`SegmentStore`](super::SegmentStore)

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The database engine rejected the operation; any open transaction was rolled back
    #[error("store backend error: {0}")]
    Backend(String),

    /// The store was opened with settings that do not match its contents
    #[error("store configuration error: {0}")]
    Configuration(String),

    /// The caller handed the store data it cannot accept (e.g. wrong embedding length)
    #[error("rejected by store: {0}")]
    InvalidOperation(String),

    /// A tag set or other structured column could not be encoded or decoded
    #[error("column encoding error: {0}")]
    Serialization(String),

    /// Stored rows violate the schema's invariants
    #[error("corrupted store data: {0}")]
    CorruptedData(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }

    /// Whether the file itself is suspect, as opposed to a single failed write
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::CorruptedData(_))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_corrupted_data_is_corruption() {
        assert!(StorageError::CorruptedData("bad blob".into()).is_corruption());
        assert!(!StorageError::backend("disk I/O error").is_corruption());
        assert!(!StorageError::InvalidOperation("dim 3".into()).is_corruption());
    }

    #[test]
    fn test_backend_message() {
        assert_eq!(
            StorageError::backend("database is locked").to_string(),
            "store backend error: database is locked"
        );
    }
}
