//! Enrichment Service Traits

use super::types::{PartialEnrichment, VideoEnrichment};
use crate::types::VideoRecord;
use anyhow::Result;

/// Produces the consolidated enrichment for one video
///
/// Implementations should degrade rather than fail: absent signal lowers
/// confidence. The orchestrator still treats an `Err` as a per-video skip.
#[async_trait::async_trait]
pub trait EnrichmentService: Send + Sync {
    /// Enrich a video from its metadata and, when available, its transcript text
    async fn enrich(&self, video: &VideoRecord, transcript_text: Option<&str>) -> Result<VideoEnrichment>;
}

/// Call-in AI model that extracts structured metadata
///
/// Only the interface is defined here; deployments plug in whatever model
/// client they use.
#[async_trait::async_trait]
pub trait EnrichmentBackend: Send + Sync {
    /// Extract from raw transcript text
    async fn extract_from_transcript(&self, text: &str) -> Result<PartialEnrichment>;

    /// Extract from title, description and channel signals
    async fn extract_from_video_metadata(&self, video: &VideoRecord) -> Result<PartialEnrichment>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
