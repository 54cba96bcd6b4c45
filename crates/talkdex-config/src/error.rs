use std::path::PathBuf;
use thiserror::Error;

/// Configuration failures; all of them are fatal at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::TalkdexConfig`]
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: toml::de::Error,
    },

    /// A remote provider was selected without credentials
    #[error("missing API key for embedding provider '{provider}' (set TALKDEX_EMBEDDING_API_KEY)")]
    MissingCredential {
        /// Provider that needs the key
        provider: String,
    },

    /// The output location cannot be written
    #[error("output path {path} is not writable: {reason}")]
    OutputNotWritable {
        /// Offending path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A value is out of range or inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
