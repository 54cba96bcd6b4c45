//! Manifest-backed discovery
//!
//! The discovery tool exports what it found as a JSON array of
//! `{ "video": VideoRecord, "transcript": [TranscriptSegment] | null }`.
//! [`ManifestSource`] serves that file through the [`VideoSource`] trait.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use talkdex_core::source::{SourceSelector, VideoSource};
use talkdex_core::types::{Transcript, VideoRecord};

/// One video and its transcript, as exported by discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub video: VideoRecord,
    #[serde(default)]
    pub transcript: Option<Transcript>,
}

impl ManifestEntry {
    pub fn new(video: VideoRecord, transcript: Option<Transcript>) -> Self {
        Self { video, transcript }
    }
}

/// In-memory [`VideoSource`] over a discovery manifest
#[derive(Debug, Clone, Default)]
pub struct ManifestSource {
    entries: Vec<ManifestEntry>,
    by_id: HashMap<String, usize>,
}

impl ManifestSource {
    /// Build from entries; a later entry with the same video id wins
    pub fn from_entries(entries: Vec<ManifestEntry>) -> Self {
        let mut deduped: Vec<ManifestEntry> = Vec::with_capacity(entries.len());
        let mut by_id = HashMap::with_capacity(entries.len());
        for entry in entries {
            match by_id.get(&entry.video.video_id) {
                Some(&i) => deduped[i] = entry,
                None => {
                    by_id.insert(entry.video.video_id.clone(), deduped.len());
                    deduped.push(entry);
                }
            }
        }
        Self {
            entries: deduped,
            by_id,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<ManifestEntry> = serde_json::from_str(json).context("Invalid manifest JSON")?;
        Ok(Self::from_entries(entries))
    }

    /// Read a manifest file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let source = Self::from_json(&contents).with_context(|| format!("In manifest {}", path.display()))?;
        debug!(path = %path.display(), videos = source.len(), "Loaded manifest");
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn selects(selector: &SourceSelector, video: &VideoRecord) -> bool {
        match selector {
            SourceSelector::All => true,
            SourceSelector::Channel(id) => video.channel_id.as_deref() == Some(id.as_str()),
            SourceSelector::Playlist(_) => selector
                .playlist_id()
                .is_some_and(|playlist| video.playlist_ids.iter().any(|p| p == playlist)),
        }
    }
}

#[async_trait]
impl VideoSource for ManifestSource {
    async fn fetch_videos(&self, selector: &SourceSelector) -> Result<Vec<VideoRecord>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| Self::selects(selector, &entry.video))
            .map(|entry| entry.video.clone())
            .collect())
    }

    async fn extract_transcript(&self, video_id: &str) -> Result<Option<Transcript>> {
        let index = self
            .by_id
            .get(video_id)
            .ok_or_else(|| anyhow!("video {} is not in the manifest", video_id))?;
        Ok(self.entries[*index].transcript.clone())
    }
}
