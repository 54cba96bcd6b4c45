//! Batch Ingestion Orchestrator
//!
//! Drives every discovered video through
//! `extracting_transcript → enriching → building_segments → embedding →
//! queued_for_commit`, groups finished videos into fixed-size batches and
//! commits each batch in one storage transaction.
//!
//! ## Failure policy
//!
//! - Anything that goes wrong for one video skips that video; the run goes on.
//! - A failed embedding for one segment stores the zero fallback for that
//!   segment only; the video is kept.
//! - A failed commit or integrity check stops the run. The report's
//!   `resume_cursor` says where a re-run should start.
//!
//! The store is switched to [`StorageProfile::Production`] for the load and
//! back to [`StorageProfile::Safe`] before `run` returns, whatever happened.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use talkdex_config::PipelineConfig;
use talkdex_core::enrichment::EnrichmentService;
use talkdex_core::error::{IngestError, IngestResult, SkipReason};
use talkdex_core::source::{SourceSelector, VideoSource};
use talkdex_core::storage::{SegmentStore, StorageProfile};
use talkdex_core::types::{VideoRecord, VideoSegment};
use talkdex_llm::{BatchEmbeddings, EmbeddingGenerator};

use crate::report::{IngestReport, VideoStage};
use crate::segments::SegmentBuilder;

/// A video that made it through every stage
struct ProcessedVideo {
    video: VideoRecord,
    segments: Vec<VideoSegment>,
    degraded: usize,
}

/// Why a video left the loop early
struct Skip {
    stage: VideoStage,
    reason: SkipReason,
    detail: String,
}

impl Skip {
    fn new(stage: VideoStage, reason: SkipReason, detail: impl Into<String>) -> Self {
        Self {
            stage,
            reason,
            detail: detail.into(),
        }
    }
}

/// Videos waiting for the next commit
#[derive(Default)]
struct Batch {
    videos: Vec<VideoRecord>,
    segments: Vec<VideoSegment>,
    degraded: usize,
}

impl Batch {
    fn push(&mut self, processed: ProcessedVideo) {
        self.videos.push(processed.video);
        self.segments.extend(processed.segments);
        self.degraded += processed.degraded;
    }

    fn len(&self) -> usize {
        self.videos.len()
    }

    fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

/// The ingestion control loop
///
/// Borrows the store for the length of the run; the caller opens it before
/// and closes it after.
pub struct IngestionOrchestrator<'a, S: SegmentStore + ?Sized> {
    store: &'a S,
    source: Arc<dyn VideoSource>,
    enrichment: Arc<dyn EnrichmentService>,
    builder: SegmentBuilder,
    generator: EmbeddingGenerator,
    config: PipelineConfig,
}

impl<'a, S: SegmentStore + ?Sized> IngestionOrchestrator<'a, S> {
    pub fn new(
        store: &'a S,
        source: Arc<dyn VideoSource>,
        enrichment: Arc<dyn EnrichmentService>,
        generator: EmbeddingGenerator,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            source,
            enrichment,
            builder: SegmentBuilder::from_config(&config),
            generator,
            config,
        }
    }

    /// Replace the segment builder derived from the config
    #[must_use]
    pub fn with_segment_builder(mut self, builder: SegmentBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingest every video the selector resolves to
    ///
    /// Never returns early without a report: fatal conditions are recorded in
    /// [`IngestReport::fatal`].
    pub async fn run(&self, selector: &SourceSelector, cancel: &CancellationToken) -> IngestReport {
        let started = Instant::now();
        let mut report = IngestReport::default();
        info!(
            selector = %selector,
            batch_size = self.config.batch_size,
            start_at = self.config.start_at,
            "Starting ingestion run"
        );

        match self.discover(selector).await {
            Ok(videos) => {
                report.discovered = videos.len();
                report.resume_cursor = self.config.start_at.min(videos.len());

                let outcome = match self.store.apply_profile(StorageProfile::Production).await {
                    Ok(()) => self.ingest(&videos, cancel, &mut report).await,
                    Err(e) => Err(IngestError::Storage(e)),
                };
                if let Err(e) = outcome {
                    error!(error = %e, resume_cursor = report.resume_cursor, "Ingestion run aborted");
                    report.fatal = Some(e);
                }

                if let Err(e) = self.store.apply_profile(StorageProfile::Safe).await {
                    error!(error = %e, "Failed to restore safe storage profile");
                    report.fatal.get_or_insert(IngestError::Storage(e));
                }
            }
            Err(e) => {
                error!(error = %e, "Discovery failed");
                report.fatal = Some(e);
            }
        }

        report.duration = started.elapsed();
        info!(
            discovered = report.discovered,
            processed = report.processed,
            skipped = report.total_skipped(),
            segments = report.segments_stored,
            degraded = report.degraded_segments,
            batches = report.batches_committed,
            cancelled = report.cancelled,
            duration_ms = report.duration.as_millis() as u64,
            "Ingestion run finished"
        );
        report
    }

    async fn discover(&self, selector: &SourceSelector) -> IngestResult<Vec<VideoRecord>> {
        debug!(stage = %VideoStage::Discovering, selector = %selector, "Discovering videos");
        let mut videos = self
            .source
            .fetch_videos(selector)
            .await
            .map_err(|e| IngestError::ProcessingFailure(format!("discovery failed: {:#}", e)))?;
        if let Some(max) = self.config.max_videos {
            videos.truncate(max);
        }
        info!(discovered = videos.len(), "Discovery complete");
        Ok(videos)
    }

    async fn ingest(
        &self,
        videos: &[VideoRecord],
        cancel: &CancellationToken,
        report: &mut IngestReport,
    ) -> IngestResult<()> {
        let batch_size = self.config.batch_size.max(1);
        let mut batch = Batch::default();
        let mut handled = report.resume_cursor;

        for (index, video) in videos.iter().enumerate().skip(self.config.start_at) {
            if cancel.is_cancelled() {
                info!(
                    pending = batch.len(),
                    remaining = videos.len() - index,
                    "Cancellation requested, committing finished videos"
                );
                report.cancelled = true;
                break;
            }

            match self.process_video(video.clone()).await {
                Ok(processed) => batch.push(processed),
                Err(skip) => {
                    warn!(
                        video_id = %video.video_id,
                        stage = %skip.stage,
                        reason = %skip.reason,
                        error = %skip.detail,
                        "Video skipped"
                    );
                    report.record_skip(skip.reason);
                }
            }
            handled = index + 1;

            if batch.len() >= batch_size {
                self.commit(&mut batch, report).await?;
            }
            if batch.is_empty() {
                report.resume_cursor = handled;
            }
        }

        if !batch.is_empty() {
            self.commit(&mut batch, report).await?;
            report.resume_cursor = handled;
        }

        if report.cancelled {
            return Ok(());
        }

        let stats = self.store.optimize().await?;
        report.optimize = Some(stats);

        let integrity = self.store.verify().await?;
        let problems = (!integrity.ok).then(|| integrity.problems.clone());
        report.integrity = Some(integrity);
        match problems {
            Some(problems) => Err(IngestError::IntegrityFailure(problems)),
            None => Ok(()),
        }
    }

    async fn commit(&self, batch: &mut Batch, report: &mut IngestReport) -> IngestResult<()> {
        let Batch {
            videos,
            segments,
            degraded,
        } = std::mem::take(batch);
        let (video_count, segment_count) = (videos.len(), segments.len());

        self.store.commit_batch(videos, segments).await?;

        report.batches_committed += 1;
        report.processed += video_count;
        report.segments_stored += segment_count;
        report.degraded_segments += degraded;
        info!(
            batch = report.batches_committed,
            videos = video_count,
            segments = segment_count,
            degraded,
            "Batch committed"
        );

        if self.config.verify_each_batch {
            let integrity = self.store.verify().await?;
            if !integrity.ok {
                return Err(IngestError::IntegrityFailure(integrity.problems));
            }
        }
        Ok(())
    }

    async fn process_video(&self, mut video: VideoRecord) -> Result<ProcessedVideo, Skip> {
        let video_id = video.video_id.clone();

        let stage = self.enter(&video_id, VideoStage::ExtractingTranscript);
        let transcript = match self.source.extract_transcript(&video_id).await {
            Ok(Some(transcript)) => transcript,
            Ok(None) => return Err(Skip::new(stage, SkipReason::NoTranscript, "no transcript available")),
            Err(e) => return Err(Skip::new(stage, SkipReason::TranscriptError, format!("{:#}", e))),
        };
        let text = transcript.full_text();
        if text.is_empty() {
            return Err(Skip::new(stage, SkipReason::EmptyTranscript, "transcript has no text"));
        }
        let hash = blake3::hash(text.as_bytes()).to_hex().to_string();

        if self.config.skip_unchanged {
            match self.store.transcript_hash(&video_id).await {
                Ok(Some(stored)) if stored == hash => {
                    return Err(Skip::new(stage, SkipReason::Unchanged, "transcript unchanged since last ingest"));
                }
                Ok(_) => {}
                Err(e) => warn!(video_id = %video_id, error = %e, "Could not read stored transcript hash"),
            }
        }

        let stage = self.enter(&video_id, VideoStage::Enriching);
        let enrichment = self
            .enrichment
            .enrich(&video, Some(&text))
            .await
            .map_err(|e| Skip::new(stage, SkipReason::EnrichmentError, format!("{:#}", e)))?;
        video.apply_enrichment(enrichment);
        video.transcript_hash = Some(hash);

        let stage = self.enter(&video_id, VideoStage::BuildingSegments);
        let mut segments =
            self.builder
                .build_attributed(&video_id, &transcript, video.enrichment.sole_speaker());
        if segments.is_empty() {
            return Err(Skip::new(stage, SkipReason::EmptyTranscript, "transcript produced no segments"));
        }

        let stage = self.enter(&video_id, VideoStage::Embedding);
        let texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();
        let BatchEmbeddings { vectors, degraded } = self.generator.generate_batch(&texts).await;
        if vectors.len() != segments.len() {
            return Err(Skip::new(
                stage,
                SkipReason::EmbeddingError,
                format!("{} embeddings for {} segments", vectors.len(), segments.len()),
            ));
        }

        let dimensions = self.generator.dimensions();
        for (i, (segment, vector)) in segments.iter_mut().zip(vectors).enumerate() {
            if degraded.binary_search(&i).is_ok() {
                segment.set_fallback_embedding(dimensions);
            } else {
                segment.set_embedding(vector);
            }
        }
        if !degraded.is_empty() {
            warn!(
                video_id = %video_id,
                degraded = degraded.len(),
                total = segments.len(),
                "Segments stored with fallback embeddings"
            );
        }

        self.enter(&video_id, VideoStage::QueuedForCommit);
        Ok(ProcessedVideo {
            video,
            segments,
            degraded: degraded.len(),
        })
    }

    /// Log a stage transition and return the stage
    fn enter(&self, video_id: &str, stage: VideoStage) -> VideoStage {
        info!(video_id, stage = %stage, "Stage transition");
        stage
    }
}
