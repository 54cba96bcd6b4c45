//! SQLite connection configuration

use std::path::{Path, PathBuf};
use talkdex_config::StorageConfig;

/// Path used for in-memory databases
pub const MEMORY_PATH: &str = ":memory:";

/// Connection settings for [`SqliteStore`](crate::SqliteStore)
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub path: PathBuf,
    /// Fixed embedding dimension D; every stored vector must have it
    pub dimensions: usize,
    pub busy_timeout_ms: u32,
    pub foreign_keys: bool,
    /// Production profile page cache in KiB
    pub production_cache_kib: u32,
    /// Production profile memory-mapped window in bytes
    pub production_mmap_bytes: u64,
}

impl SqliteConfig {
    pub fn new(path: impl AsRef<Path>, dimensions: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            dimensions,
            busy_timeout_ms: 5000,
            foreign_keys: true,
            production_cache_kib: 65_536,
            production_mmap_bytes: 268_435_456,
        }
    }

    /// In-memory database, for tests
    pub fn memory(dimensions: usize) -> Self {
        Self::new(MEMORY_PATH, dimensions)
    }

    /// From the `[storage]` config section
    pub fn from_storage_config(storage: &StorageConfig, dimensions: usize) -> Self {
        Self {
            path: storage.path.clone(),
            dimensions,
            busy_timeout_ms: storage.busy_timeout_ms,
            foreign_keys: true,
            production_cache_kib: storage.production_cache_kib,
            production_mmap_bytes: storage.production_mmap_bytes,
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(MEMORY_PATH)
    }
}
