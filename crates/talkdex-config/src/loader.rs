//! Configuration file loading

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::TalkdexConfig;
use crate::error::{ConfigError, ConfigResult};

/// Loads [`TalkdexConfig`] from TOML files
pub struct ConfigLoader;

impl ConfigLoader {
    /// `~/.config/talkdex/config.toml` (platform config dir)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("talkdex").join("config.toml"))
    }

    /// Parse a TOML string
    pub fn load_from_str(contents: &str, origin: &Path) -> ConfigResult<TalkdexConfig> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read and parse a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<TalkdexConfig> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::load_from_str(&contents, path)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load an explicit file, or the default file if present, or defaults
    ///
    /// An explicitly requested file that does not exist is an error; a missing
    /// default file is not.
    pub fn load_or_default(explicit: Option<&Path>) -> ConfigResult<TalkdexConfig> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from_file(path),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(TalkdexConfig::default())
            }
        }
    }
}
