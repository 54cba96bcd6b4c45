//! SqliteStore commit tests
//!
//! Atomicity of batch commits, segment replacement on re-ingest, dimension
//! enforcement and read-back of stored rows.

use std::collections::BTreeSet;
use talkdex_core::enrichment::{DifficultyLevel, EnrichmentSource, SessionType, VideoEnrichment};
use talkdex_core::storage::{SegmentStore, StorageError, StorageProfile};
use talkdex_core::types::{VideoRecord, VideoSegment};
use talkdex_core::EmbeddingVector;
use talkdex_sqlite::{SqliteConfig, SqliteStore};
use tempfile::TempDir;

const DIMS: usize = 4;

// ============================================================================
// Helper Functions
// ============================================================================

fn video(id: &str) -> VideoRecord {
    let mut record = VideoRecord::new(id, format!("Talk {}", id), format!("https://www.youtube.com/watch?v={}", id))
        .with_channel("UCtalks")
        .with_duration(1800);
    record.transcript_hash = Some(format!("hash-{}", id));
    record
}

fn segment(video_id: &str, ordinal: u32, text: &str) -> VideoSegment {
    VideoSegment {
        segment_id: VideoSegment::make_id(video_id, ordinal),
        video_id: video_id.to_string(),
        ordinal,
        start: f64::from(ordinal) * 10.0,
        end: f64::from(ordinal) * 10.0 + 9.5,
        text: text.to_string(),
        embedding: EmbeddingVector::new(vec![0.5, 0.5, 0.5, 0.5]),
        embedding_degraded: false,
        confidence: 0.9,
        speaker: "unknown".to_string(),
    }
}

fn segments(video_id: &str, n: u32) -> Vec<VideoSegment> {
    (1..=n)
        .map(|i| segment(video_id, i, &format!("segment {} about serverless data", i)))
        .collect()
}

// ============================================================================
// TEST: Batch commit
// ============================================================================

#[tokio::test]
async fn test_commit_batch_persists_videos_and_segments() {
    let store = SqliteStore::memory(DIMS).unwrap();

    let mut degraded = segment("v2", 1, "static noise");
    degraded.set_fallback_embedding(DIMS);

    let mut segs = segments("v1", 3);
    segs.push(degraded);

    store
        .commit_batch(vec![video("v1"), video("v2")], segs)
        .await
        .unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.video_count, 2);
    assert_eq!(stats.segment_count, 4);
    assert_eq!(stats.degraded_segment_count, 1);

    let stored = store.load_segments("v1").await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].segment_id, "v1_seg_1");
    assert_eq!(stored[2].embedding.as_slice(), &[0.5, 0.5, 0.5, 0.5]);

    let fallback = store.load_segments("v2").await.unwrap();
    assert!(fallback[0].embedding_degraded);
    assert!(fallback[0].embedding.is_zero());
    assert_eq!(fallback[0].embedding.dimensions(), DIMS);
}

#[tokio::test]
async fn test_failed_commit_leaves_no_rows() {
    let store = SqliteStore::memory(DIMS).unwrap();

    // Duplicate segment id violates the UNIQUE constraint mid-transaction
    let mut segs = segments("v1", 2);
    segs.push(segment("v1", 2, "duplicate ordinal"));

    let result = store.commit_batch(vec![video("v1"), video("v2")], segs).await;
    assert!(matches!(result, Err(StorageError::Backend(_))));

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.video_count, 0);
    assert_eq!(stats.segment_count, 0);
}

#[tokio::test]
async fn test_segments_for_unknown_video_rejected_atomically() {
    let store = SqliteStore::memory(DIMS).unwrap();
    store.upsert_video_metadata(vec![video("v1")]).await.unwrap();

    let mut segs = segments("v1", 2);
    segs.extend(segments("ghost", 1));

    assert!(store.insert_segments(segs).await.is_err());
    assert_eq!(store.stats().await.unwrap().segment_count, 0);
}

#[tokio::test]
async fn test_wrong_dimension_rejects_whole_call() {
    let store = SqliteStore::memory(DIMS).unwrap();

    let mut bad = segment("v1", 2, "too short");
    bad.embedding = EmbeddingVector::new(vec![1.0, 2.0]);
    let segs = vec![segment("v1", 1, "fine"), bad];

    let err = store.commit_batch(vec![video("v1")], segs).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidOperation(_)));
    assert_eq!(store.stats().await.unwrap().video_count, 0);
}

#[tokio::test]
async fn test_empty_batch_is_noop() {
    let store = SqliteStore::memory(DIMS).unwrap();
    store.commit_batch(Vec::new(), Vec::new()).await.unwrap();
    assert_eq!(store.upsert_video_metadata(Vec::new()).await.unwrap(), 0);
    assert_eq!(store.insert_segments(Vec::new()).await.unwrap(), 0);
    assert_eq!(store.stats().await.unwrap().video_count, 0);
}

// ============================================================================
// TEST: Re-ingest
// ============================================================================

#[tokio::test]
async fn test_reingest_replaces_segments_and_updates_metadata() {
    let store = SqliteStore::memory(DIMS).unwrap();
    store.commit_batch(vec![video("v1")], segments("v1", 5)).await.unwrap();

    let mut updated = video("v1");
    updated.title = "Renamed talk".to_string();
    updated.transcript_hash = Some("new-hash".to_string());
    store.commit_batch(vec![updated], segments("v1", 2)).await.unwrap();

    let stored = store.load_video("v1").await.unwrap().unwrap();
    assert_eq!(stored.title, "Renamed talk");
    assert_eq!(store.transcript_hash("v1").await.unwrap().as_deref(), Some("new-hash"));
    assert_eq!(store.load_segments("v1").await.unwrap().len(), 2);
    assert_eq!(store.stats().await.unwrap().segment_count, 2);
    assert!(store.verify().await.unwrap().ok);
}

#[tokio::test]
async fn test_transcript_hash_of_unknown_video() {
    let store = SqliteStore::memory(DIMS).unwrap();
    assert_eq!(store.transcript_hash("nope").await.unwrap(), None);
}

#[tokio::test]
async fn test_enrichment_round_trips_through_row() {
    let store = SqliteStore::memory(DIMS).unwrap();
    let mut record = video("v1");
    record.apply_enrichment(VideoEnrichment {
        level: DifficultyLevel::Advanced,
        session_type: SessionType::ChalkTalk,
        services: ["AWS Lambda".to_string()].into_iter().collect(),
        speakers: ["Ana Lima".to_string(), "Kai Wu".to_string()].into_iter().collect(),
        source: EnrichmentSource::Combined,
        confidence: 0.7,
        ..Default::default()
    });
    store.upsert_video_metadata(vec![record.clone()]).await.unwrap();

    let stored = store.load_video("v1").await.unwrap().unwrap();
    assert_eq!(stored.enrichment.level, DifficultyLevel::Advanced);
    assert_eq!(stored.enrichment.session_type, SessionType::ChalkTalk);
    assert_eq!(stored.enrichment.speakers.len(), 2);
    assert_eq!(stored.enrichment.topics, BTreeSet::new());
    assert_eq!(stored.enrichment.source, EnrichmentSource::Combined);
    assert!((stored.enrichment.confidence - 0.7).abs() < 1e-6);
    assert_eq!(stored.channel_id.as_deref(), Some("UCtalks"));
}

// ============================================================================
// TEST: Lifecycle
// ============================================================================

#[tokio::test]
async fn test_file_store_reopen_and_dimension_guard() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("talkdex.db");

    let store = SqliteStore::open(SqliteConfig::new(&path, DIMS)).unwrap();
    store.apply_profile(StorageProfile::Production).await.unwrap();
    assert_eq!(store.current_profile(), StorageProfile::Production);
    store.commit_batch(vec![video("v1")], segments("v1", 3)).await.unwrap();
    store.close().unwrap();

    let reopened = SqliteStore::open(SqliteConfig::new(&path, DIMS)).unwrap();
    assert_eq!(reopened.current_profile(), StorageProfile::Safe);
    assert_eq!(reopened.stats().await.unwrap().segment_count, 3);
    reopened.close().unwrap();

    assert!(SqliteStore::open(SqliteConfig::new(&path, 1024)).is_err());
}

#[tokio::test]
async fn test_open_existing_uses_recorded_dimension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("talkdex.db");

    assert!(SqliteStore::open_existing(&path).is_err());

    let store = SqliteStore::open(SqliteConfig::new(&path, DIMS)).unwrap();
    store.commit_batch(vec![video("v1")], segments("v1", 2)).await.unwrap();
    store.close().unwrap();

    let existing = SqliteStore::open_existing(&path).unwrap();
    assert_eq!(existing.dimensions(), DIMS);
    assert!(existing.verify().await.unwrap().ok);
    existing.close().unwrap();
}
