//! Discovery collaborator
//!
//! Resolving a channel or playlist into videos and fetching transcripts is
//! done outside the pipeline; this trait is the boundary.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Transcript, VideoRecord};

/// Which videos to ingest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SourceSelector {
    /// Every video on a channel
    Channel(String),
    /// Every video in a playlist (URL or playlist id)
    Playlist(String),
    /// Everything the source knows about
    All,
}

impl SourceSelector {
    /// Interpret a user-supplied channel id or playlist URL
    ///
    /// Anything carrying a `list=` query parameter or starting with `PL` is a
    /// playlist; everything else is treated as a channel id.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "*" {
            return Self::All;
        }
        if value.contains("list=") || value.starts_with("PL") {
            Self::Playlist(value.to_string())
        } else {
            Self::Channel(value.to_string())
        }
    }

    /// Playlist id portion of a playlist selector (`list=` parameter or the raw value)
    pub fn playlist_id(&self) -> Option<&str> {
        match self {
            Self::Playlist(value) => Some(
                value
                    .split_once("list=")
                    .map(|(_, rest)| rest.split('&').next().unwrap_or(rest))
                    .unwrap_or(value.as_str()),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(id) => write!(f, "channel:{}", id),
            Self::Playlist(url) => write!(f, "playlist:{}", url),
            Self::All => f.write_str("all"),
        }
    }
}

/// Video discovery and transcript retrieval
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Resolve a channel or playlist into video records
    async fn fetch_videos(&self, selector: &SourceSelector) -> Result<Vec<VideoRecord>>;

    /// Timed transcript of a video, `None` when the video has none
    async fn extract_transcript(&self, video_id: &str) -> Result<Option<Transcript>>;

    /// Plain transcript text of a video, `None` when the video has none
    async fn transcript_text(&self, video_id: &str) -> Result<Option<String>> {
        Ok(self
            .extract_transcript(video_id)
            .await?
            .map(|t| t.full_text())
            .filter(|text| !text.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector() {
        assert_eq!(
            SourceSelector::parse("UCd6MoB9NC6uYN2grvUNT-Zg"),
            SourceSelector::Channel("UCd6MoB9NC6uYN2grvUNT-Zg".into())
        );
        assert!(matches!(
            SourceSelector::parse("https://www.youtube.com/playlist?list=PLhr1KZpdzuke"),
            SourceSelector::Playlist(_)
        ));
        assert_eq!(SourceSelector::parse("  "), SourceSelector::All);
    }

    #[test]
    fn test_playlist_id_extraction() {
        let selector = SourceSelector::parse("https://www.youtube.com/playlist?list=PLabc&si=xyz");
        assert_eq!(selector.playlist_id(), Some("PLabc"));

        let bare = SourceSelector::parse("PLdef");
        assert_eq!(bare.playlist_id(), Some("PLdef"));

        assert_eq!(SourceSelector::Channel("UC1".into()).playlist_id(), None);
    }
}
