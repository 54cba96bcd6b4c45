//! Schema management and migrations

use crate::error::{SqliteError, SqliteResult};
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i32 = 1;

/// Key under which the store's embedding dimension is recorded
const DIMENSION_KEY: &str = "embedding_dim";

/// Apply all pending migrations
pub fn apply_migrations(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version = get_current_version(conn)?;
    debug!(current_version, target_version = SCHEMA_VERSION, "Checking migrations");

    if current_version < SCHEMA_VERSION {
        info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Applying schema migrations"
        );
        apply_migration_v1(conn)?;
    }

    Ok(())
}

/// Embedding dimension recorded in the store, if any
pub fn stored_dimension(conn: &Connection) -> SqliteResult<Option<usize>> {
    let has_meta: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'store_meta')",
        [],
        |row| row.get(0),
    )?;
    if !has_meta {
        return Ok(None);
    }

    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM store_meta WHERE key = ?1",
            [DIMENSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    stored
        .map(|value| {
            value
                .parse()
                .map_err(|_| SqliteError::Schema(format!("invalid stored dimension '{}'", value)))
        })
        .transpose()
}

/// Record the embedding dimension on first open; reject a different one later
pub fn ensure_dimension(conn: &Connection, dimensions: usize) -> SqliteResult<()> {
    match stored_dimension(conn)? {
        None => {
            conn.execute(
                "INSERT INTO store_meta (key, value) VALUES (?1, ?2)",
                (DIMENSION_KEY, dimensions.to_string()),
            )?;
            Ok(())
        }
        Some(stored) if stored == dimensions => Ok(()),
        Some(stored) => Err(SqliteError::StoreDimension {
            stored,
            configured: dimensions,
        }),
    }
}

fn get_current_version(conn: &Connection) -> SqliteResult<i32> {
    let version: Option<i32> = conn.query_row(
        "SELECT MAX(version) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    Ok(version.unwrap_or(0))
}

fn record_migration(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: videos, segments and the segment full-text index
fn apply_migration_v1(conn: &Connection) -> SqliteResult<()> {
    debug!("Applying migration v1: videos, segments, segments_fts");

    conn.execute_batch(SCHEMA_V1)
        .map_err(|e| SqliteError::Schema(format!("Failed to apply v1 schema: {}", e)))?;

    record_migration(conn, 1)?;
    info!("Migration v1 applied successfully");
    Ok(())
}

/// Initial schema SQL
const SCHEMA_V1: &str = r#"
-- ============================================================================
-- TABLE: store_meta
-- ============================================================================

CREATE TABLE IF NOT EXISTS store_meta (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);

-- ============================================================================
-- TABLE: videos
-- ============================================================================
-- One row per ingested video. Tag sets are JSON arrays.

CREATE TABLE IF NOT EXISTS videos (
    video_id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    published_at TEXT,
    duration_secs INTEGER NOT NULL DEFAULT 0,
    channel_id TEXT,
    description TEXT,
    playlist_ids TEXT NOT NULL DEFAULT '[]',
    level TEXT NOT NULL DEFAULT 'unknown',
    session_type TEXT NOT NULL DEFAULT 'unknown',
    services TEXT NOT NULL DEFAULT '[]',
    topics TEXT NOT NULL DEFAULT '[]',
    industries TEXT NOT NULL DEFAULT '[]',
    speakers TEXT NOT NULL DEFAULT '[]',
    keywords TEXT NOT NULL DEFAULT '[]',
    enrichment_source TEXT NOT NULL DEFAULT 'none',
    enrichment_confidence REAL NOT NULL DEFAULT 0.0
        CHECK (enrichment_confidence >= 0.0 AND enrichment_confidence <= 1.0),
    transcript_hash TEXT,
    segment_count INTEGER NOT NULL DEFAULT 0,
    ingested_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_videos_channel ON videos(channel_id);
CREATE INDEX IF NOT EXISTS idx_videos_published ON videos(published_at);

-- ============================================================================
-- TABLE: segments
-- ============================================================================
-- Embeddings are little-endian f32 blobs of 4 * embedding_dim bytes.
-- embedding_degraded = 1 marks the zero-vector fallback.

CREATE TABLE IF NOT EXISTS segments (
    id INTEGER PRIMARY KEY,
    segment_id TEXT NOT NULL UNIQUE,
    video_id TEXT NOT NULL REFERENCES videos(video_id) ON DELETE CASCADE,
    ordinal INTEGER NOT NULL,
    start_secs REAL NOT NULL,
    end_secs REAL NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    embedding_dim INTEGER NOT NULL,
    embedding_degraded INTEGER NOT NULL DEFAULT 0 CHECK (embedding_degraded IN (0, 1)),
    confidence REAL NOT NULL,
    speaker TEXT NOT NULL DEFAULT 'unknown',
    UNIQUE (video_id, ordinal)
);

CREATE INDEX IF NOT EXISTS idx_segments_video ON segments(video_id, ordinal);
CREATE INDEX IF NOT EXISTS idx_segments_degraded ON segments(video_id) WHERE embedding_degraded = 1;

-- ============================================================================
-- FTS5: segments_fts
-- ============================================================================
-- External-content index over segment text, kept in sync by triggers.

CREATE VIRTUAL TABLE IF NOT EXISTS segments_fts USING fts5(
    text,
    content='segments',
    content_rowid='id',
    tokenize='porter unicode61'
);

CREATE TRIGGER IF NOT EXISTS segments_ai AFTER INSERT ON segments BEGIN
    INSERT INTO segments_fts(rowid, text) VALUES (new.id, new.text);
END;

CREATE TRIGGER IF NOT EXISTS segments_ad AFTER DELETE ON segments BEGIN
    INSERT INTO segments_fts(segments_fts, rowid, text) VALUES ('delete', old.id, old.text);
END;

CREATE TRIGGER IF NOT EXISTS segments_au AFTER UPDATE ON segments BEGIN
    INSERT INTO segments_fts(segments_fts, rowid, text) VALUES ('delete', old.id, old.text);
    INSERT INTO segments_fts(rowid, text) VALUES (new.id, new.text);
END;
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_create_tables() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn).unwrap();

        let tables: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .unwrap();
            let rows = stmt.query_map([], |row| row.get(0)).unwrap();
            rows.filter_map(Result::ok).collect()
        };

        for table in ["videos", "segments", "segments_fts", "store_meta", "schema_migrations"] {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
        assert_eq!(get_current_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn).unwrap();
        apply_migrations(&conn).unwrap();
        assert_eq!(get_current_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_dimension_recorded_and_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn).unwrap();

        ensure_dimension(&conn, 1024).unwrap();
        ensure_dimension(&conn, 1024).unwrap();
        assert!(matches!(
            ensure_dimension(&conn, 512),
            Err(SqliteError::StoreDimension {
                stored: 1024,
                configured: 512
            })
        ));
    }

    #[test]
    fn test_stored_dimension_before_and_after_migration() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(stored_dimension(&conn).unwrap(), None);

        apply_migrations(&conn).unwrap();
        assert_eq!(stored_dimension(&conn).unwrap(), None);

        ensure_dimension(&conn, 384).unwrap();
        assert_eq!(stored_dimension(&conn).unwrap(), Some(384));
    }
}
