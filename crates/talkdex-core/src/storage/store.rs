//! SegmentStore Storage Abstraction
//!
//! Bulk, atomic persistence of video metadata rows and segment rows, plus the
//! post-load maintenance operations.
//!
//! # Atomicity
//!
//! Every write method is atomic with respect to the records passed in one
//! call: either all of them become durably visible or none do.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::error::StorageResult;
use crate::types::{VideoRecord, VideoSegment};

/// Connection tuning profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProfile {
    /// Full sync, default cache; used outside bulk loads
    #[default]
    Safe,
    /// Larger cache, memory-mapped reads, relaxed-but-safe sync; used for bulk loads
    Production,
}

impl fmt::Display for StorageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => f.write_str("safe"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Database size statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbStats {
    pub page_count: u64,
    pub page_size: u64,
    pub freelist_count: u64,
    pub total_size_bytes: u64,
    pub video_count: u64,
    pub segment_count: u64,
    pub degraded_segment_count: u64,
}

/// Result of an optimisation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizeStats {
    pub before: DbStats,
    pub after: DbStats,
    pub duration: Duration,
}

impl OptimizeStats {
    /// Bytes reclaimed by the pass (zero if the file grew)
    pub fn reclaimed_bytes(&self) -> u64 {
        self.before
            .total_size_bytes
            .saturating_sub(self.after.total_size_bytes)
    }
}

/// Timing of one diagnostic query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTiming {
    pub name: String,
    pub duration: Duration,
    /// Rows returned or counted
    pub rows: u64,
}

/// Outcome of an integrity check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub ok: bool,
    /// Human-readable description of each problem found
    pub problems: Vec<String>,
    pub timings: Vec<QueryTiming>,
}

impl IntegrityReport {
    pub fn passed(timings: Vec<QueryTiming>) -> Self {
        Self {
            ok: true,
            problems: Vec::new(),
            timings,
        }
    }

    pub fn failed(problems: Vec<String>, timings: Vec<QueryTiming>) -> Self {
        Self {
            ok: false,
            problems,
            timings,
        }
    }
}

/// Durable store for videos and their segments
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Switch connection tuning
    async fn apply_profile(&self, profile: StorageProfile) -> StorageResult<()>;

    /// Insert or update video metadata rows in one transaction
    async fn upsert_video_metadata(&self, records: Vec<VideoRecord>) -> StorageResult<usize>;

    /// Insert segment rows in one transaction
    ///
    /// Existing segments of the affected videos are replaced.
    async fn insert_segments(&self, segments: Vec<VideoSegment>) -> StorageResult<usize>;

    /// Write a whole batch (metadata and segments) in one transaction
    async fn commit_batch(
        &self,
        records: Vec<VideoRecord>,
        segments: Vec<VideoSegment>,
    ) -> StorageResult<()>;

    /// Stored transcript hash of a video, if the video is stored
    async fn transcript_hash(&self, video_id: &str) -> StorageResult<Option<String>>;

    /// Refresh indexes and statistics and reclaim space; idempotent
    async fn optimize(&self) -> StorageResult<OptimizeStats>;

    /// Run integrity checks
    async fn verify(&self) -> StorageResult<IntegrityReport>;

    async fn stats(&self) -> StorageResult<DbStats>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reclaimed_bytes_saturates() {
        let stats = OptimizeStats {
            before: DbStats {
                total_size_bytes: 100,
                ..Default::default()
            },
            after: DbStats {
                total_size_bytes: 150,
                ..Default::default()
            },
            duration: Duration::ZERO,
        };
        assert_eq!(stats.reclaimed_bytes(), 0);
    }

    #[test]
    fn test_profile_default_is_safe() {
        assert_eq!(StorageProfile::default(), StorageProfile::Safe);
        assert_eq!(StorageProfile::Production.to_string(), "production");
    }
}
