//! SegmentStore implementation over SQLite
//!
//! Every write runs in one transaction on a blocking thread. The store owns
//! the only connection; it is not `Clone` and [`SqliteStore::close`] consumes
//! it, so the connection is opened once and closed once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

use talkdex_core::embedding::EmbeddingVector;
use talkdex_core::enrichment::VideoEnrichment;
use talkdex_core::storage::{
    DbStats, IntegrityReport, OptimizeStats, SegmentStore, StorageError, StorageProfile, StorageResult,
};
use talkdex_core::types::{VideoRecord, VideoSegment};

use crate::config::SqliteConfig;
use crate::connection::{self, SqliteConnection};
use crate::error::{SqliteError, SqliteResult};
use crate::maintenance;
use crate::schema;

/// SQLite-backed store for videos and segments
pub struct SqliteStore {
    conn: SqliteConnection,
    config: SqliteConfig,
    profile: Mutex<StorageProfile>,
}

impl SqliteStore {
    /// Open (creating if needed) the database described by `config`
    pub fn open(config: SqliteConfig) -> SqliteResult<Self> {
        let conn = SqliteConnection::open(&config)?;
        Ok(Self {
            conn,
            config,
            profile: Mutex::new(StorageProfile::Safe),
        })
    }

    /// Open a database created earlier, using the dimension recorded in it
    pub fn open_existing(path: impl AsRef<Path>) -> SqliteResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SqliteError::Connection(format!("no database at {}", path.display())));
        }
        let conn = Connection::open(path)?;
        let stored = schema::stored_dimension(&conn)?;
        drop(conn);

        let dimensions = stored
            .ok_or_else(|| SqliteError::Schema(format!("{} is not a talkdex database", path.display())))?;
        Self::open(SqliteConfig::new(path, dimensions))
    }

    /// In-memory store, for tests
    pub fn memory(dimensions: usize) -> SqliteResult<Self> {
        Self::open(SqliteConfig::memory(dimensions))
    }

    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    pub fn current_profile(&self) -> StorageProfile {
        *self.profile.lock()
    }

    /// Restore the safe profile and close the connection
    pub fn close(self) -> SqliteResult<()> {
        info!(path = ?self.config.path, "Closing SQLite database");
        let Self { conn, config, .. } = self;
        conn.with_connection(|c| {
            connection::apply_profile(c, &config, StorageProfile::Safe)?;
            if !config.is_memory() {
                c.query_row("PRAGMA wal_checkpoint(TRUNCATE);", [], |_| Ok(()))?;
            }
            Ok(())
        })?;
        conn.close()
    }

    /// Stored video row, if any
    pub async fn load_video(&self, video_id: &str) -> StorageResult<Option<VideoRecord>> {
        let video_id = video_id.to_string();
        self.blocking(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM videos WHERE video_id = ?1", VIDEO_COLUMNS),
                [&video_id],
                row_to_video,
            )
            .optional()?
            .transpose()
        })
        .await
    }

    /// Stored segments of a video in ordinal order
    pub async fn load_segments(&self, video_id: &str) -> StorageResult<Vec<VideoSegment>> {
        let video_id = video_id.to_string();
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT segment_id, video_id, ordinal, start_secs, end_secs, text,
                        embedding, embedding_degraded, confidence, speaker
                 FROM segments WHERE video_id = ?1 ORDER BY ordinal",
            )?;
            let rows = stmt.query_map([&video_id], row_to_segment)?;
            let mut segments = Vec::new();
            for row in rows {
                segments.push(row??);
            }
            Ok(segments)
        })
        .await
    }

    /// Run `f` with the connection on a blocking thread
    async fn blocking<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || conn.with_connection_mut(f))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .map_err(Into::into)
    }

    fn check_segments(&self, segments: &[VideoSegment]) -> SqliteResult<()> {
        for segment in segments {
            if segment.embedding.dimensions() != self.config.dimensions {
                return Err(SqliteError::EmbeddingDimension {
                    segment_id: segment.segment_id.clone(),
                    expected: self.config.dimensions,
                    actual: segment.embedding.dimensions(),
                });
            }
            if !segment.embedding.is_finite() {
                return Err(SqliteError::InvalidOperation(format!(
                    "segment {} has a non-finite embedding",
                    segment.segment_id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SegmentStore for SqliteStore {
    async fn apply_profile(&self, profile: StorageProfile) -> StorageResult<()> {
        let config = self.config.clone();
        self.blocking(move |conn| connection::apply_profile(conn, &config, profile))
            .await?;
        *self.profile.lock() = profile;
        info!(profile = %profile, "Storage profile applied");
        Ok(())
    }

    async fn upsert_video_metadata(&self, records: Vec<VideoRecord>) -> StorageResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            let count = upsert_videos(&tx, &records)?;
            tx.commit()?;
            Ok(count)
        })
        .await
    }

    async fn insert_segments(&self, segments: Vec<VideoSegment>) -> StorageResult<usize> {
        if segments.is_empty() {
            return Ok(0);
        }
        self.check_segments(&segments)?;
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            let count = replace_segments(&tx, &segments)?;
            tx.commit()?;
            Ok(count)
        })
        .await
    }

    async fn commit_batch(&self, records: Vec<VideoRecord>, segments: Vec<VideoSegment>) -> StorageResult<()> {
        if records.is_empty() && segments.is_empty() {
            return Ok(());
        }
        self.check_segments(&segments)?;
        let (video_count, segment_count) = (records.len(), segments.len());
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            upsert_videos(&tx, &records)?;
            replace_segments(&tx, &segments)?;
            tx.commit()?;
            Ok(())
        })
        .await?;
        debug!(videos = video_count, segments = segment_count, "Batch committed");
        Ok(())
    }

    async fn transcript_hash(&self, video_id: &str) -> StorageResult<Option<String>> {
        let video_id = video_id.to_string();
        self.blocking(move |conn| {
            let hash: Option<Option<String>> = conn
                .query_row(
                    "SELECT transcript_hash FROM videos WHERE video_id = ?1",
                    [&video_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(hash.flatten())
        })
        .await
    }

    async fn optimize(&self) -> StorageResult<OptimizeStats> {
        let is_memory = self.config.is_memory();
        self.blocking(move |conn| maintenance::optimize(conn, is_memory)).await
    }

    async fn verify(&self) -> StorageResult<IntegrityReport> {
        let dimensions = self.config.dimensions;
        self.blocking(move |conn| maintenance::verify(conn, dimensions)).await
    }

    async fn stats(&self) -> StorageResult<DbStats> {
        self.blocking(|conn| connection::stats(conn)).await
    }
}

fn upsert_videos(conn: &Connection, records: &[VideoRecord]) -> SqliteResult<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO videos (
            video_id, title, url, published_at, duration_secs, channel_id, description,
            playlist_ids, level, session_type, services, topics, industries, speakers, keywords,
            enrichment_source, enrichment_confidence, transcript_hash, ingested_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, datetime('now'))
         ON CONFLICT(video_id) DO UPDATE SET
            title = excluded.title,
            url = excluded.url,
            published_at = excluded.published_at,
            duration_secs = excluded.duration_secs,
            channel_id = excluded.channel_id,
            description = excluded.description,
            playlist_ids = excluded.playlist_ids,
            level = excluded.level,
            session_type = excluded.session_type,
            services = excluded.services,
            topics = excluded.topics,
            industries = excluded.industries,
            speakers = excluded.speakers,
            keywords = excluded.keywords,
            enrichment_source = excluded.enrichment_source,
            enrichment_confidence = excluded.enrichment_confidence,
            transcript_hash = excluded.transcript_hash,
            ingested_at = excluded.ingested_at",
    )?;

    for video in records {
        let e = &video.enrichment;
        stmt.execute(params![
            video.video_id,
            video.title,
            video.url,
            video.published_at.map(|t| t.to_rfc3339()),
            video.duration_secs as i64,
            video.channel_id,
            video.description,
            serde_json::to_string(&video.playlist_ids)?,
            e.level.as_str(),
            e.session_type.as_str(),
            serde_json::to_string(&e.services)?,
            serde_json::to_string(&e.topics)?,
            serde_json::to_string(&e.industries)?,
            serde_json::to_string(&e.speakers)?,
            serde_json::to_string(&e.keywords)?,
            e.source.as_str(),
            f64::from(e.confidence.clamp(0.0, 1.0)),
            video.transcript_hash,
        ])?;
    }
    Ok(records.len())
}

/// Insert segments, first removing earlier segments of the same videos
fn replace_segments(conn: &Connection, segments: &[VideoSegment]) -> SqliteResult<usize> {
    let video_ids: BTreeSet<&str> = segments.iter().map(|s| s.video_id.as_str()).collect();

    {
        let mut delete = conn.prepare_cached("DELETE FROM segments WHERE video_id = ?1")?;
        for video_id in &video_ids {
            delete.execute([video_id])?;
        }
    }

    let mut insert = conn.prepare_cached(
        "INSERT INTO segments (
            segment_id, video_id, ordinal, start_secs, end_secs, text,
            embedding, embedding_dim, embedding_degraded, confidence, speaker
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    for segment in segments {
        insert.execute(params![
            segment.segment_id,
            segment.video_id,
            segment.ordinal,
            segment.start,
            segment.end,
            segment.text,
            segment.embedding.to_le_bytes(),
            segment.embedding.dimensions() as i64,
            segment.embedding_degraded,
            f64::from(segment.confidence),
            segment.speaker,
        ])?;
    }

    let mut count = conn.prepare_cached(
        "UPDATE videos SET segment_count = (SELECT COUNT(*) FROM segments WHERE video_id = ?1)
         WHERE video_id = ?1",
    )?;
    for video_id in &video_ids {
        count.execute([video_id])?;
    }

    Ok(segments.len())
}

const VIDEO_COLUMNS: &str = "video_id, title, url, published_at, duration_secs, channel_id, description,
    playlist_ids, level, session_type, services, topics, industries, speakers, keywords,
    enrichment_source, enrichment_confidence, transcript_hash";

fn json_set(raw: String) -> SqliteResult<BTreeSet<String>> {
    serde_json::from_str(&raw).map_err(|e| SqliteError::Corrupted(format!("tag set '{}': {}", raw, e)))
}

fn row_to_video(row: &Row<'_>) -> rusqlite::Result<SqliteResult<VideoRecord>> {
    let published_at: Option<String> = row.get(3)?;
    let playlist_ids: String = row.get(7)?;
    let level: String = row.get(8)?;
    let session_type: String = row.get(9)?;
    let services: String = row.get(10)?;
    let topics: String = row.get(11)?;
    let industries: String = row.get(12)?;
    let speakers: String = row.get(13)?;
    let keywords: String = row.get(14)?;
    let source: String = row.get(15)?;
    let confidence: f64 = row.get(16)?;

    let mut video = VideoRecord::new(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
    );
    video.duration_secs = row.get::<_, i64>(4)?.max(0) as u64;
    video.channel_id = row.get(5)?;
    video.description = row.get(6)?;
    video.transcript_hash = row.get(17)?;

    let decoded = (|| -> SqliteResult<VideoRecord> {
        video.published_at = published_at
            .map(|t| {
                DateTime::parse_from_rfc3339(&t)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| SqliteError::Corrupted(format!("published_at '{}': {}", t, e)))
            })
            .transpose()?;
        video.playlist_ids = serde_json::from_str(&playlist_ids)?;
        video.enrichment = VideoEnrichment {
            level: level.parse().map_err(SqliteError::Corrupted)?,
            session_type: session_type.parse().map_err(SqliteError::Corrupted)?,
            services: json_set(services)?,
            topics: json_set(topics)?,
            industries: json_set(industries)?,
            speakers: json_set(speakers)?,
            keywords: json_set(keywords)?,
            source: source.parse().map_err(SqliteError::Corrupted)?,
            confidence: confidence as f32,
        };
        Ok(video)
    })();
    Ok(decoded)
}

fn row_to_segment(row: &Row<'_>) -> rusqlite::Result<SqliteResult<VideoSegment>> {
    let blob: Vec<u8> = row.get(6)?;
    let segment_id: String = row.get(0)?;
    let embedding = match EmbeddingVector::from_le_bytes(&blob) {
        Ok(v) => v,
        Err(e) => return Ok(Err(SqliteError::Corrupted(format!("segment {}: {}", segment_id, e)))),
    };
    Ok(Ok(VideoSegment {
        segment_id,
        video_id: row.get(1)?,
        ordinal: row.get(2)?,
        start: row.get(3)?,
        end: row.get(4)?,
        text: row.get(5)?,
        embedding,
        embedding_degraded: row.get(7)?,
        confidence: row.get::<_, f64>(8)? as f32,
        speaker: row.get(9)?,
    }))
}
