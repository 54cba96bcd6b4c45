//! Videos, raw transcripts and derived segments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingVector;
use crate::enrichment::VideoEnrichment;

/// Speaker label used when no better attribution is available
pub const UNKNOWN_SPEAKER: &str = "unknown";

/// One discovered video
///
/// Identity fields come from discovery and never change. The enrichment
/// block is filled once by the orchestrator before the record is queued for
/// storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform video identifier (primary key)
    pub video_id: String,

    pub title: String,

    /// Canonical watch URL
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    /// Duration in seconds
    #[serde(default)]
    pub duration_secs: u64,

    /// Channel the video was published on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Playlists this video was discovered through
    #[serde(default)]
    pub playlist_ids: Vec<String>,

    /// Structured metadata derived by enrichment
    #[serde(default)]
    pub enrichment: VideoEnrichment,

    /// BLAKE3 hex digest of the transcript text the segments were built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_hash: Option<String>,
}

impl VideoRecord {
    /// Create a record with the identity fields only
    pub fn new(video_id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            url: url.into(),
            published_at: None,
            duration_secs: 0,
            channel_id: None,
            description: None,
            playlist_ids: Vec::new(),
            enrichment: VideoEnrichment::default(),
            transcript_hash: None,
        }
    }

    /// Builder-style: set the channel
    #[must_use]
    pub fn with_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Builder-style: set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder-style: set the duration in seconds
    #[must_use]
    pub fn with_duration(mut self, duration_secs: u64) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    /// Builder-style: set the publish timestamp
    #[must_use]
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Builder-style: add a playlist membership
    #[must_use]
    pub fn with_playlist(mut self, playlist_id: impl Into<String>) -> Self {
        self.playlist_ids.push(playlist_id.into());
        self
    }

    /// Replace the enrichment block
    pub fn apply_enrichment(&mut self, enrichment: VideoEnrichment) {
        self.enrichment = enrichment;
    }
}

/// A timed span of transcript text as delivered by the transcript source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start offset in seconds
    pub start: f64,

    /// End offset in seconds (greater than `start` for well-formed spans)
    pub end: f64,

    pub text: String,

    /// Recognition confidence in [0, 1]
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

fn default_confidence() -> f32 {
    1.0
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            confidence: 1.0,
            speaker: None,
        }
    }

    /// Builder-style: set the confidence (clamped to [0, 1])
    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Builder-style: set the speaker label
    #[must_use]
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Span length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the span satisfies the input invariants (text present, end after start)
    pub fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty() && self.end > self.start
    }
}

/// Ordered transcript of one video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// All span texts joined by single spaces
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Vec<TranscriptSegment>> for Transcript {
    fn from(segments: Vec<TranscriptSegment>) -> Self {
        Self::new(segments)
    }
}

/// The persisted unit of search
///
/// Built without an embedding by the segment builder; the orchestrator fills
/// `embedding` exactly once. A failed generation leaves the zero vector in
/// place and sets `embedding_degraded`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSegment {
    /// `{video_id}_seg_{ordinal}`
    pub segment_id: String,

    pub video_id: String,

    /// 1-based position within the video
    pub ordinal: u32,

    pub start: f64,
    pub end: f64,
    pub text: String,

    #[serde(default)]
    pub embedding: EmbeddingVector,

    /// True when `embedding` is the zero fallback
    #[serde(default)]
    pub embedding_degraded: bool,

    pub confidence: f32,

    pub speaker: String,
}

impl VideoSegment {
    /// Deterministic segment identifier for a video and 1-based ordinal
    pub fn make_id(video_id: &str, ordinal: u32) -> String {
        format!("{}_seg_{}", video_id, ordinal)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether an embedding (real or fallback) has been attached
    pub fn has_embedding(&self) -> bool {
        !self.embedding.is_empty()
    }

    /// Attach a generated embedding
    pub fn set_embedding(&mut self, embedding: EmbeddingVector) {
        self.embedding = embedding;
        self.embedding_degraded = false;
    }

    /// Attach the zero fallback of the given dimension
    pub fn set_fallback_embedding(&mut self, dimensions: usize) {
        self.embedding = EmbeddingVector::zeros(dimensions);
        self.embedding_degraded = true;
    }
}
