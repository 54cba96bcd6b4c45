//! Common test utilities for orchestrator tests.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use talkdex_config::{EnrichmentConfig, PipelineConfig};
use talkdex_core::enrichment::{EnrichmentService, VideoEnrichment};
use talkdex_core::source::{SourceSelector, VideoSource};
use talkdex_core::storage::{
    DbStats, IntegrityReport, OptimizeStats, SegmentStore, StorageError, StorageProfile, StorageResult,
};
use talkdex_core::types::{Transcript, TranscriptSegment, VideoRecord, VideoSegment};
use talkdex_llm::{EmbeddingGenerator, MockEmbeddingProvider};
use talkdex_pipeline::{CancellationToken, IngestionOrchestrator, ManifestEntry, ManifestSource};
use talkdex_sqlite::SqliteStore;

pub const DIMS: usize = 8;

// ============================================================================
// Fixtures
// ============================================================================

pub fn video(id: &str) -> VideoRecord {
    VideoRecord::new(id, format!("Serverless talk {}", id), format!("https://youtu.be/{}", id))
        .with_channel("UCtalks")
        .with_description("A breakout session about AWS Lambda and event-driven design")
}

/// Transcript of `spans` ten-second spans
pub fn transcript(spans: usize) -> Transcript {
    Transcript::new(
        (0..spans)
            .map(|i| {
                let start = i as f64 * 10.0;
                TranscriptSegment::new(start, start + 10.0, format!("part {} covers queues and retries", i + 1))
            })
            .collect(),
    )
}

pub fn entry(id: &str, transcript: Option<Transcript>) -> ManifestEntry {
    ManifestEntry::new(video(id), transcript)
}

pub fn generator(provider: MockEmbeddingProvider) -> EmbeddingGenerator {
    EmbeddingGenerator::new(Arc::new(provider), DIMS)
}

pub fn enrichment() -> Arc<dyn EnrichmentService> {
    talkdex_enrichment::create_enrichment_service(&EnrichmentConfig::default(), None)
}

pub fn pipeline_config(batch_size: usize) -> PipelineConfig {
    PipelineConfig {
        batch_size,
        ..Default::default()
    }
}

pub fn orchestrator<'a, S: SegmentStore + ?Sized>(
    store: &'a S,
    source: Arc<dyn VideoSource>,
    config: PipelineConfig,
) -> IngestionOrchestrator<'a, S> {
    IngestionOrchestrator::new(
        store,
        source,
        enrichment(),
        generator(MockEmbeddingProvider::with_dimensions(DIMS)),
        config,
    )
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

/// SQLite store that records commits and can fail one of them
pub struct RecordingStore {
    pub inner: SqliteStore,
    commits: Mutex<Vec<usize>>,
    profiles: Mutex<Vec<StorageProfile>>,
    fail_commit: Option<usize>,
    optimize_calls: Mutex<usize>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::memory(DIMS).unwrap(),
            commits: Mutex::new(Vec::new()),
            profiles: Mutex::new(Vec::new()),
            fail_commit: None,
            optimize_calls: Mutex::new(0),
        }
    }

    /// Fail the n-th (1-based) commit
    pub fn failing_commit(mut self, n: usize) -> Self {
        self.fail_commit = Some(n);
        self
    }

    /// Video count of every successful commit, in order
    pub fn commits(&self) -> Vec<usize> {
        self.commits.lock().unwrap().clone()
    }

    pub fn profiles(&self) -> Vec<StorageProfile> {
        self.profiles.lock().unwrap().clone()
    }

    pub fn optimize_calls(&self) -> usize {
        *self.optimize_calls.lock().unwrap()
    }
}

#[async_trait]
impl SegmentStore for RecordingStore {
    async fn apply_profile(&self, profile: StorageProfile) -> StorageResult<()> {
        self.profiles.lock().unwrap().push(profile);
        self.inner.apply_profile(profile).await
    }

    async fn upsert_video_metadata(&self, records: Vec<VideoRecord>) -> StorageResult<usize> {
        self.inner.upsert_video_metadata(records).await
    }

    async fn insert_segments(&self, segments: Vec<VideoSegment>) -> StorageResult<usize> {
        self.inner.insert_segments(segments).await
    }

    async fn commit_batch(&self, records: Vec<VideoRecord>, segments: Vec<VideoSegment>) -> StorageResult<()> {
        let attempt = self.commits.lock().unwrap().len() + 1;
        if self.fail_commit == Some(attempt) {
            return Err(StorageError::backend("simulated disk failure"));
        }
        let count = records.len();
        self.inner.commit_batch(records, segments).await?;
        self.commits.lock().unwrap().push(count);
        Ok(())
    }

    async fn transcript_hash(&self, video_id: &str) -> StorageResult<Option<String>> {
        self.inner.transcript_hash(video_id).await
    }

    async fn optimize(&self) -> StorageResult<OptimizeStats> {
        *self.optimize_calls.lock().unwrap() += 1;
        self.inner.optimize().await
    }

    async fn verify(&self) -> StorageResult<IntegrityReport> {
        self.inner.verify().await
    }

    async fn stats(&self) -> StorageResult<DbStats> {
        self.inner.stats().await
    }
}

/// Manifest source with transcript failures and a cancellation trigger
pub struct ScriptedSource {
    inner: ManifestSource,
    broken: HashSet<String>,
    cancel_after: Option<(String, CancellationToken)>,
}

impl ScriptedSource {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self {
            inner: ManifestSource::from_entries(entries),
            broken: HashSet::new(),
            cancel_after: None,
        }
    }

    /// Transcript retrieval for `video_id` errors
    pub fn broken(mut self, video_id: &str) -> Self {
        self.broken.insert(video_id.to_string());
        self
    }

    /// Cancel `token` while `video_id`'s transcript is being fetched
    pub fn cancel_during(mut self, video_id: &str, token: CancellationToken) -> Self {
        self.cancel_after = Some((video_id.to_string(), token));
        self
    }
}

#[async_trait]
impl VideoSource for ScriptedSource {
    async fn fetch_videos(&self, selector: &SourceSelector) -> Result<Vec<VideoRecord>> {
        self.inner.fetch_videos(selector).await
    }

    async fn extract_transcript(&self, video_id: &str) -> Result<Option<Transcript>> {
        if let Some((id, token)) = &self.cancel_after {
            if id == video_id {
                token.cancel();
            }
        }
        if self.broken.contains(video_id) {
            return Err(anyhow!("transcript service timed out"));
        }
        self.inner.extract_transcript(video_id).await
    }
}

/// Enrichment service that errors for selected videos
pub struct FailingEnrichment {
    inner: Arc<dyn EnrichmentService>,
    fail_ids: HashSet<String>,
}

impl FailingEnrichment {
    pub fn new(fail_ids: &[&str]) -> Self {
        Self {
            inner: enrichment(),
            fail_ids: fail_ids.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl EnrichmentService for FailingEnrichment {
    async fn enrich(&self, video: &VideoRecord, transcript_text: Option<&str>) -> Result<VideoEnrichment> {
        if self.fail_ids.contains(&video.video_id) {
            return Err(anyhow!("enrichment model returned garbage"));
        }
        self.inner.enrich(video, transcript_text).await
    }
}
