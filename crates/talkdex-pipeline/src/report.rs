//! Run summary and per-video stages

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use talkdex_core::error::{IngestError, SkipReason};
use talkdex_core::storage::{IntegrityReport, OptimizeStats};

/// Stage of one video in the ingestion loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoStage {
    Discovering,
    ExtractingTranscript,
    Enriching,
    BuildingSegments,
    Embedding,
    QueuedForCommit,
    /// Terminal: excluded from its batch, the run continues
    Skipped,
    /// Terminal: the run stopped
    Failed,
}

impl VideoStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovering => "discovering",
            Self::ExtractingTranscript => "extracting_transcript",
            Self::Enriching => "enriching",
            Self::BuildingSegments => "building_segments",
            Self::Embedding => "embedding",
            Self::QueuedForCommit => "queued_for_commit",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Skipped | Self::Failed)
    }
}

impl fmt::Display for VideoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one [`IngestionOrchestrator::run`](crate::IngestionOrchestrator::run)
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Videos returned by discovery (after the `max_videos` cap)
    pub discovered: usize,
    /// Videos committed to storage
    pub processed: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Segments committed to storage
    pub segments_stored: usize,
    /// Committed segments holding the zero fallback
    pub degraded_segments: usize,
    pub batches_committed: usize,
    /// Discovered videos fully handled with nothing left uncommitted before
    /// them; pass as `start_at` to resume
    pub resume_cursor: usize,
    pub cancelled: bool,
    /// The error that stopped the run, if any
    pub fatal: Option<IngestError>,
    pub optimize: Option<OptimizeStats>,
    pub integrity: Option<IntegrityReport>,
    pub duration: Duration,
}

impl IngestReport {
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    /// Completed without a fatal error or cancellation
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.fatal.is_none()
    }

    /// Final store size, when an optimisation pass ran
    pub fn final_size_bytes(&self) -> Option<u64> {
        self.optimize.as_ref().map(|o| o.after.total_size_bytes)
    }
}
