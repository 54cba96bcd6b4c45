//! Metadata enrichment adapter
//!
//! Produces one [`VideoEnrichment`] per video from two partial extractions:
//! one over the video metadata (title, description, channel) and one over the
//! transcript text. When a model backend is configured it is consulted first
//! and the dictionary extraction fills whatever it missed; a backend error is
//! logged and the dictionary result stands alone.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use talkdex_config::EnrichmentConfig;
use talkdex_core::enrichment::{
    EnrichmentBackend, EnrichmentService, EnrichmentSource, PartialEnrichment, VideoEnrichment,
};
use talkdex_core::types::VideoRecord;

use crate::extractor::KeywordExtractor;

pub struct MetadataEnrichmentAdapter {
    extractor: KeywordExtractor,
    backend: Option<Arc<dyn EnrichmentBackend>>,
}

impl MetadataEnrichmentAdapter {
    pub fn new(config: &EnrichmentConfig) -> Self {
        Self {
            extractor: KeywordExtractor::new(config),
            backend: None,
        }
    }

    /// Builder-style: consult a model backend before dictionary extraction
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn EnrichmentBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Partial enrichment from transcript content alone
    ///
    /// Blank text returns an empty, zero-confidence partial without calling
    /// the backend.
    pub async fn extract_from_transcript(&self, text: &str) -> PartialEnrichment {
        if text.trim().is_empty() {
            return PartialEnrichment::empty(EnrichmentSource::None);
        }
        let local = self.extractor.extract(text, EnrichmentSource::Transcript);

        match &self.backend {
            Some(backend) => match backend.extract_from_transcript(text).await {
                Ok(remote) => remote.combine(local),
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "Transcript enrichment backend failed, using dictionary extraction");
                    local
                }
            },
            None => local,
        }
    }

    /// Partial enrichment from title, description and channel signals alone
    pub async fn extract_from_video_metadata(&self, video: &VideoRecord) -> PartialEnrichment {
        let local = self
            .extractor
            .extract(&metadata_text(video), EnrichmentSource::VideoMetadata);

        match &self.backend {
            Some(backend) => match backend.extract_from_video_metadata(video).await {
                Ok(remote) => remote.combine(local),
                Err(e) => {
                    warn!(
                        backend = backend.name(),
                        video_id = %video.video_id,
                        error = %e,
                        "Metadata enrichment backend failed, using dictionary extraction"
                    );
                    local
                }
            },
            None => local,
        }
    }

    /// Merge two partials (see [`PartialEnrichment::combine`])
    pub fn combine(a: PartialEnrichment, b: PartialEnrichment) -> PartialEnrichment {
        a.combine(b)
    }
}

fn metadata_text(video: &VideoRecord) -> String {
    let mut parts = vec![video.title.as_str()];
    if let Some(description) = video.description.as_deref() {
        parts.push(description);
    }
    parts.join("\n")
}

#[async_trait]
impl EnrichmentService for MetadataEnrichmentAdapter {
    async fn enrich(&self, video: &VideoRecord, transcript_text: Option<&str>) -> Result<VideoEnrichment> {
        let from_metadata = self.extract_from_video_metadata(video).await;
        let from_transcript = match transcript_text {
            Some(text) => self.extract_from_transcript(text).await,
            None => PartialEnrichment::empty(EnrichmentSource::None),
        };

        let merged = Self::combine(from_metadata, from_transcript);
        debug!(
            video_id = %video.video_id,
            source = %merged.source,
            confidence = merged.confidence,
            "Enriched video"
        );
        Ok(VideoEnrichment::from(merged))
    }
}
