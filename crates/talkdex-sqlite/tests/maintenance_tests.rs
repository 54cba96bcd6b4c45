//! Optimize and verify tests

use talkdex_core::storage::SegmentStore;
use talkdex_core::types::{VideoRecord, VideoSegment};
use talkdex_core::EmbeddingVector;
use talkdex_sqlite::{SqliteConfig, SqliteStore};
use tempfile::TempDir;

const DIMS: usize = 8;

fn batch(video_count: usize, segments_per_video: u32) -> (Vec<VideoRecord>, Vec<VideoSegment>) {
    let mut videos = Vec::new();
    let mut segments = Vec::new();
    for v in 0..video_count {
        let id = format!("vid{}", v);
        videos.push(VideoRecord::new(&id, format!("Talk {}", v), format!("https://youtu.be/{}", id)));
        for ordinal in 1..=segments_per_video {
            segments.push(VideoSegment {
                segment_id: VideoSegment::make_id(&id, ordinal),
                video_id: id.clone(),
                ordinal,
                start: f64::from(ordinal),
                end: f64::from(ordinal) + 1.0,
                text: format!("data pipelines part {} of talk {}", ordinal, v),
                embedding: EmbeddingVector::new(vec![0.25; DIMS]),
                embedding_degraded: false,
                confidence: 1.0,
                speaker: "unknown".to_string(),
            });
        }
    }
    (videos, segments)
}

#[tokio::test]
async fn test_optimize_on_empty_store() {
    let store = SqliteStore::memory(DIMS).unwrap();
    let stats = store.optimize().await.unwrap();
    assert_eq!(stats.after.video_count, 0);
    // Idempotent
    store.optimize().await.unwrap();
    assert!(store.verify().await.unwrap().ok);
}

#[tokio::test]
async fn test_optimize_reclaims_space_after_reingest() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(SqliteConfig::new(dir.path().join("t.db"), DIMS)).unwrap();

    let (videos, segments) = batch(20, 30);
    store.commit_batch(videos.clone(), segments).await.unwrap();

    // Re-ingest with far fewer segments leaves free pages behind
    let (_, fewer) = batch(20, 1);
    store.commit_batch(videos, fewer).await.unwrap();
    let before = store.stats().await.unwrap();
    assert!(before.freelist_count > 0);

    let optimized = store.optimize().await.unwrap();
    assert_eq!(optimized.after.freelist_count, 0);
    assert!(optimized.reclaimed_bytes() > 0);
    assert_eq!(optimized.after.segment_count, 20);
    store.close().unwrap();
}

#[tokio::test]
async fn test_verify_reports_timings() {
    let store = SqliteStore::memory(DIMS).unwrap();
    let (videos, segments) = batch(3, 4);
    store.commit_batch(videos, segments).await.unwrap();

    let report = store.verify().await.unwrap();
    assert!(report.ok, "problems: {:?}", report.problems);
    assert!(report.problems.is_empty());

    let names: Vec<&str> = report.timings.iter().map(|t| t.name.as_str()).collect();
    for expected in ["integrity_check", "foreign_key_check", "fts_integrity_check", "count_segments", "fts_match"] {
        assert!(names.contains(&expected), "missing timing {}", expected);
    }
    let count = report.timings.iter().find(|t| t.name == "count_segments").unwrap();
    assert_eq!(count.rows, 12);
    let fts = report.timings.iter().find(|t| t.name == "fts_match").unwrap();
    assert_eq!(fts.rows, 12);
}
