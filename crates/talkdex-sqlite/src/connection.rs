//! SQLite connection handle and profile tuning
//!
//! A single `Arc<Mutex<Connection>>` is shared with `spawn_blocking` tasks.
//! The handle is crate-private; [`SqliteStore`](crate::SqliteStore) owns it.

use crate::config::SqliteConfig;
use crate::error::{SqliteError, SqliteResult};
use crate::schema;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use talkdex_core::storage::{DbStats, StorageProfile};
use tracing::{debug, info};

#[derive(Clone)]
pub(crate) struct SqliteConnection {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteConnection {
    /// Open the database, apply base pragmas and migrations
    pub(crate) fn open(config: &SqliteConfig) -> SqliteResult<Self> {
        info!(path = ?config.path, "Opening SQLite database");

        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SqliteError::Connection(format!("Failed to create directory: {}", e))
                })?;
            }
            Connection::open(&config.path)?
        };

        configure_base_pragmas(&conn, config)?;
        schema::apply_migrations(&conn)?;
        schema::ensure_dimension(&conn, config.dimensions)?;
        info!(dimensions = config.dimensions, "SQLite database initialized successfully");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute a closure with the connection
    pub(crate) fn with_connection<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Execute a closure with mutable access to the connection
    pub(crate) fn with_connection_mut<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T>,
    {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }

    /// Close the connection; fails if another handle is still alive
    pub(crate) fn close(self) -> SqliteResult<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => mutex
                .into_inner()
                .close()
                .map_err(|(_, e)| SqliteError::Rusqlite(e)),
            Err(_) => Err(SqliteError::Connection(
                "connection is still in use by a background task".to_string(),
            )),
        }
    }
}

fn configure_base_pragmas(conn: &Connection, config: &SqliteConfig) -> SqliteResult<()> {
    debug!("Configuring SQLite pragmas");

    if !config.is_memory() {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    }

    if config.foreign_keys {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    }

    conn.execute_batch(&format!("PRAGMA busy_timeout = {};", config.busy_timeout_ms))?;

    apply_profile(conn, config, StorageProfile::Safe)
}

/// Apply the tuning pragmas of a profile
pub(crate) fn apply_profile(conn: &Connection, config: &SqliteConfig, profile: StorageProfile) -> SqliteResult<()> {
    match profile {
        StorageProfile::Safe => conn.execute_batch(
            "PRAGMA synchronous = FULL;
             PRAGMA cache_size = -2000;
             PRAGMA mmap_size = 0;
             PRAGMA temp_store = DEFAULT;",
        )?,
        StorageProfile::Production => {
            if !config.is_memory() {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            conn.execute_batch(&format!(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA cache_size = -{};
                 PRAGMA mmap_size = {};
                 PRAGMA temp_store = MEMORY;",
                config.production_cache_kib, config.production_mmap_bytes
            ))?
        }
    }
    debug!(profile = %profile, "Applied storage profile");
    Ok(())
}

/// Database size and row statistics
pub(crate) fn stats(conn: &Connection) -> SqliteResult<DbStats> {
    let page_count: i64 = conn.query_row("PRAGMA page_count;", [], |row| row.get(0))?;
    let page_size: i64 = conn.query_row("PRAGMA page_size;", [], |row| row.get(0))?;
    let freelist_count: i64 = conn.query_row("PRAGMA freelist_count;", [], |row| row.get(0))?;

    let video_count: i64 = conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))?;
    let (segment_count, degraded_segment_count): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(embedding_degraded), 0) FROM segments",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(DbStats {
        page_count: page_count as u64,
        page_size: page_size as u64,
        freelist_count: freelist_count as u64,
        total_size_bytes: (page_count * page_size) as u64,
        video_count: video_count as u64,
        segment_count: segment_count as u64,
        degraded_segment_count: degraded_segment_count as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pragma_i64(conn: &SqliteConnection, pragma: &str) -> i64 {
        conn.with_connection(|c| Ok(c.query_row(pragma, [], |row| row.get(0))?))
            .unwrap()
    }

    #[test]
    fn test_file_database_uses_wal() {
        let dir = TempDir::new().unwrap();
        let config = SqliteConfig::new(dir.path().join("talkdex.db"), 8);
        let conn = SqliteConnection::open(&config).unwrap();

        let mode: String = conn
            .with_connection(|c| Ok(c.query_row("PRAGMA journal_mode;", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        conn.close().unwrap();
    }

    #[test]
    fn test_profiles_switch_pragmas() {
        let dir = TempDir::new().unwrap();
        let config = SqliteConfig::new(dir.path().join("talkdex.db"), 8);
        let conn = SqliteConnection::open(&config).unwrap();

        // FULL = 2, NORMAL = 1
        assert_eq!(pragma_i64(&conn, "PRAGMA synchronous;"), 2);

        conn.with_connection(|c| apply_profile(c, &config, StorageProfile::Production))
            .unwrap();
        assert_eq!(pragma_i64(&conn, "PRAGMA synchronous;"), 1);
        assert_eq!(pragma_i64(&conn, "PRAGMA cache_size;"), -65_536);
        // MEMORY = 2
        assert_eq!(pragma_i64(&conn, "PRAGMA temp_store;"), 2);

        conn.with_connection(|c| apply_profile(c, &config, StorageProfile::Safe))
            .unwrap();
        assert_eq!(pragma_i64(&conn, "PRAGMA synchronous;"), 2);
        assert_eq!(pragma_i64(&conn, "PRAGMA mmap_size;"), 0);
    }

    #[test]
    fn test_stats_on_empty_database() {
        let conn = SqliteConnection::open(&SqliteConfig::memory(8)).unwrap();
        let stats = conn.with_connection(stats).unwrap();
        assert!(stats.page_size > 0);
        assert_eq!(stats.video_count, 0);
        assert_eq!(stats.degraded_segment_count, 0);
    }

    #[test]
    fn test_close_refuses_while_shared() {
        let conn = SqliteConnection::open(&SqliteConfig::memory(8)).unwrap();
        let other = conn.clone();
        assert!(conn.close().is_err());
        drop(other);
    }
}
