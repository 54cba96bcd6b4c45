//! SQLite storage backend for talkdex
//!
//! Implements [`talkdex_core::SegmentStore`] over a single SQLite file:
//!
//! - **videos**: one metadata row per video, tag sets as JSON arrays
//! - **segments**: one row per segment with a fixed-length `f32` embedding blob
//!   and an `embedding_degraded` flag for zero-vector fallbacks
//! - **segments_fts**: FTS5 index over segment text for lexical fallback search
//!
//! ## Usage
//!
//! ```rust,ignore
//! use talkdex_sqlite::{SqliteConfig, SqliteStore};
//! use talkdex_core::SegmentStore;
//!
//! let store = SqliteStore::open(SqliteConfig::new("./talkdex.db", 1024))?;
//! store.commit_batch(videos, segments).await?;
//! store.optimize().await?;
//! store.close()?;
//! ```

pub mod config;
mod connection;
pub mod error;
mod maintenance;
pub mod schema;
pub mod store;

// Re-exports
pub use config::SqliteConfig;
pub use error::{SqliteError, SqliteResult};
pub use store::SqliteStore;
