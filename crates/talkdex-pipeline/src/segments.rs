//! Segment Builder
//!
//! Turns a raw transcript into addressable [`VideoSegment`] records with
//! stable `{video_id}_seg_{n}` identifiers. Embeddings are left empty for the
//! orchestrator to fill.

use talkdex_config::PipelineConfig;
use talkdex_core::embedding::EmbeddingVector;
use talkdex_core::types::{Transcript, TranscriptSegment, VideoSegment, UNKNOWN_SPEAKER};
use tracing::debug;

/// Builds segments from transcripts
#[derive(Debug, Clone, Default)]
pub struct SegmentBuilder {
    merge_window_secs: Option<f64>,
}

impl SegmentBuilder {
    /// One segment per well-formed span
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate consecutive spans until a window reaches `secs` seconds
    ///
    /// Non-positive or non-finite windows disable merging.
    #[must_use]
    pub fn with_merge_window(mut self, secs: f64) -> Self {
        self.merge_window_secs = Some(secs).filter(|s| s.is_finite() && *s > 0.0);
        self
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        match config.merge_window_secs {
            Some(secs) => Self::new().with_merge_window(secs),
            None => Self::new(),
        }
    }

    pub fn merge_window_secs(&self) -> Option<f64> {
        self.merge_window_secs
    }

    /// Build segments for a video
    ///
    /// An empty result means the video has no searchable content.
    pub fn build(&self, video_id: &str, transcript: &Transcript) -> Vec<VideoSegment> {
        self.build_attributed(video_id, transcript, None)
    }

    /// Build segments, labelling unattributed spans with `sole_speaker`
    ///
    /// Speaker labels come from the span itself, else `sole_speaker`, else
    /// [`UNKNOWN_SPEAKER`].
    pub fn build_attributed(
        &self,
        video_id: &str,
        transcript: &Transcript,
        sole_speaker: Option<&str>,
    ) -> Vec<VideoSegment> {
        let kept: Vec<&TranscriptSegment> = transcript
            .segments
            .iter()
            .filter(|span| {
                let ok = span.is_well_formed();
                if !ok {
                    debug!(
                        video_id,
                        start = span.start,
                        end = span.end,
                        "Dropping malformed transcript span"
                    );
                }
                ok
            })
            .collect();

        let windows = match self.merge_window_secs {
            Some(window) => merge_spans(&kept, window),
            None => kept.iter().map(|span| Window::from_span(*span)).collect(),
        };

        windows
            .into_iter()
            .enumerate()
            .map(|(i, window)| {
                let ordinal = (i + 1) as u32;
                let speaker = window
                    .speaker
                    .or(sole_speaker)
                    .unwrap_or(UNKNOWN_SPEAKER)
                    .to_string();
                let confidence = window.confidence();
                VideoSegment {
                    segment_id: VideoSegment::make_id(video_id, ordinal),
                    video_id: video_id.to_string(),
                    ordinal,
                    start: window.start,
                    end: window.end,
                    text: window.text,
                    embedding: EmbeddingVector::default(),
                    embedding_degraded: false,
                    confidence,
                    speaker,
                }
            })
            .collect()
    }
}

/// Spans accumulated into one segment
struct Window<'a> {
    start: f64,
    end: f64,
    text: String,
    speaker: Option<&'a str>,
    weighted_confidence: f64,
    covered_secs: f64,
}

impl<'a> Window<'a> {
    fn from_span(span: &'a TranscriptSegment) -> Self {
        let duration = span.duration();
        Self {
            start: span.start,
            end: span.end,
            text: span.text.trim().to_string(),
            speaker: span.speaker.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            weighted_confidence: f64::from(span.confidence) * duration,
            covered_secs: duration,
        }
    }

    fn push(&mut self, span: &TranscriptSegment) {
        let duration = span.duration();
        self.end = self.end.max(span.end);
        self.text.push(' ');
        self.text.push_str(span.text.trim());
        self.weighted_confidence += f64::from(span.confidence) * duration;
        self.covered_secs += duration;
    }

    /// Duration-weighted mean of the span confidences
    fn confidence(&self) -> f32 {
        if self.covered_secs > 0.0 {
            ((self.weighted_confidence / self.covered_secs) as f32).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Greedy window merge; a speaker change always starts a new window
fn merge_spans<'a>(spans: &[&'a TranscriptSegment], window_secs: f64) -> Vec<Window<'a>> {
    let mut windows: Vec<Window<'a>> = Vec::new();
    for &span in spans {
        let label = span.speaker.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match windows.last_mut() {
            Some(current) if current.end - current.start < window_secs && current.speaker == label => {
                current.push(span)
            }
            _ => windows.push(Window::from_span(span)),
        }
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(spans: Vec<TranscriptSegment>) -> Transcript {
        Transcript::new(spans)
    }

    #[test]
    fn test_ids_are_dense_and_one_based() {
        let t = transcript(vec![
            TranscriptSegment::new(0.0, 2.0, "welcome everyone"),
            TranscriptSegment::new(2.0, 2.0, "zero length"),
            TranscriptSegment::new(2.0, 4.0, "   "),
            TranscriptSegment::new(4.0, 6.0, "today we talk about queues"),
        ]);
        let segments = SegmentBuilder::new().build("vid", &t);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].segment_id, "vid_seg_1");
        assert_eq!(segments[1].segment_id, "vid_seg_2");
        assert_eq!(segments[1].ordinal, 2);
        assert_eq!(segments[1].start, 4.0);
        assert!(segments.iter().all(|s| !s.has_embedding()));
    }

    #[test]
    fn test_empty_transcript_yields_nothing() {
        assert!(SegmentBuilder::new().build("vid", &Transcript::default()).is_empty());
    }

    #[test]
    fn test_build_is_stable_across_runs() {
        let t = transcript(vec![
            TranscriptSegment::new(0.0, 1.0, "a"),
            TranscriptSegment::new(1.0, 2.0, "b"),
        ]);
        let builder = SegmentBuilder::new();
        assert_eq!(builder.build("v", &t), builder.build("v", &t));
    }

    #[test]
    fn test_speaker_fallback_order() {
        let t = transcript(vec![
            TranscriptSegment::new(0.0, 1.0, "hi").with_speaker("Host"),
            TranscriptSegment::new(1.0, 2.0, "thanks"),
        ]);

        let attributed = SegmentBuilder::new().build_attributed("v", &t, Some("Ana Lima"));
        assert_eq!(attributed[0].speaker, "Host");
        assert_eq!(attributed[1].speaker, "Ana Lima");

        let anonymous = SegmentBuilder::new().build("v", &t);
        assert_eq!(anonymous[1].speaker, UNKNOWN_SPEAKER);
    }

    #[test]
    fn test_merge_window_weights_confidence_by_duration() {
        let t = transcript(vec![
            TranscriptSegment::new(0.0, 3.0, "first").with_confidence(1.0),
            TranscriptSegment::new(3.0, 4.0, "second").with_confidence(0.2),
            TranscriptSegment::new(4.0, 6.0, "third"),
            TranscriptSegment::new(6.0, 11.0, "fourth"),
        ]);
        let segments = SegmentBuilder::new().with_merge_window(4.0).build("v", &t);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "first second");
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 4.0);
        // (1.0 * 3 + 0.2 * 1) / 4
        assert!((segments[0].confidence - 0.8).abs() < 1e-6);
        assert_eq!(segments[1].text, "third fourth");
        assert_eq!(segments[1].segment_id, "v_seg_2");
    }

    #[test]
    fn test_merge_breaks_on_speaker_change() {
        let t = transcript(vec![
            TranscriptSegment::new(0.0, 1.0, "question?").with_speaker("Host"),
            TranscriptSegment::new(1.0, 2.0, "answer").with_speaker("Guest"),
        ]);
        let segments = SegmentBuilder::new().with_merge_window(60.0).build("v", &t);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].speaker, "Guest");
    }

    #[test]
    fn test_invalid_window_disables_merging() {
        assert_eq!(SegmentBuilder::new().with_merge_window(0.0).merge_window_secs(), None);
        assert_eq!(SegmentBuilder::new().with_merge_window(f64::NAN).merge_window_secs(), None);

        let config = PipelineConfig {
            merge_window_secs: Some(30.0),
            ..Default::default()
        };
        assert_eq!(SegmentBuilder::from_config(&config).merge_window_secs(), Some(30.0));
    }
}
