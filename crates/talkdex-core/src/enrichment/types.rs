//! Enrichment domain types
//!
//! A [`PartialEnrichment`] is what one signal source (transcript, video
//! metadata, model backend) can tell us. Partials merge with a total
//! [`PartialEnrichment::combine`]; the consolidated [`VideoEnrichment`] is what
//! gets stored, with explicit `Unknown` sentinels for anything nobody knew.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// Audience level of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    /// 100-level
    Introductory,
    /// 200-level
    Intermediate,
    /// 300-level
    Advanced,
    /// 400-level
    Expert,
    #[default]
    Unknown,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introductory => "introductory",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
            Self::Unknown => "unknown",
        }
    }

    /// Map a numeric level (100, 200, 301, 415, ...) to a difficulty
    pub fn from_level_number(level: u32) -> Self {
        match level / 100 {
            1 => Self::Introductory,
            2 => Self::Intermediate,
            3 => Self::Advanced,
            4 => Self::Expert,
            _ => Self::Unknown,
        }
    }

    /// Parse a session code such as `SVC301` or `DAT-402`
    pub fn from_session_code(code: &str) -> Self {
        let digits: String = code
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.len() != 3 {
            return Self::Unknown;
        }
        digits
            .parse::<u32>()
            .map(Self::from_level_number)
            .unwrap_or(Self::Unknown)
    }

    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "introductory" | "beginner" | "100" => Ok(Self::Introductory),
            "intermediate" | "200" => Ok(Self::Intermediate),
            "advanced" | "300" => Ok(Self::Advanced),
            "expert" | "400" => Ok(Self::Expert),
            "unknown" | "" => Ok(Self::Unknown),
            other => Err(format!("unknown difficulty level: {}", other)),
        }
    }
}

/// Format of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Keynote,
    Breakout,
    Workshop,
    ChalkTalk,
    BuildersSession,
    LightningTalk,
    Interview,
    #[default]
    Unknown,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keynote => "keynote",
            Self::Breakout => "breakout",
            Self::Workshop => "workshop",
            Self::ChalkTalk => "chalk_talk",
            Self::BuildersSession => "builders_session",
            Self::LightningTalk => "lightning_talk",
            Self::Interview => "interview",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "keynote" => Ok(Self::Keynote),
            "breakout" | "breakout_session" => Ok(Self::Breakout),
            "workshop" => Ok(Self::Workshop),
            "chalk_talk" => Ok(Self::ChalkTalk),
            "builders_session" | "builder_session" => Ok(Self::BuildersSession),
            "lightning_talk" => Ok(Self::LightningTalk),
            "interview" => Ok(Self::Interview),
            "unknown" | "" => Ok(Self::Unknown),
            other => Err(format!("unknown session type: {}", other)),
        }
    }
}

/// Where an enrichment value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentSource {
    Transcript,
    VideoMetadata,
    Model,
    Combined,
    /// No signal at all
    #[default]
    None,
}

impl EnrichmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transcript => "transcript",
            Self::VideoMetadata => "video_metadata",
            Self::Model => "model",
            Self::Combined => "combined",
            Self::None => "none",
        }
    }
}

impl fmt::Display for EnrichmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrichmentSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "transcript" => Ok(Self::Transcript),
            "video_metadata" => Ok(Self::VideoMetadata),
            "model" => Ok(Self::Model),
            "combined" => Ok(Self::Combined),
            "none" | "" => Ok(Self::None),
            other => Err(format!("unknown enrichment source: {}", other)),
        }
    }
}

/// What a single signal source could extract
///
/// Scalar fields are `None` when the source had no opinion; set fields are
/// empty in that case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialEnrichment {
    pub source: EnrichmentSource,

    #[serde(default)]
    pub level: Option<DifficultyLevel>,

    #[serde(default)]
    pub session_type: Option<SessionType>,

    #[serde(default)]
    pub services: BTreeSet<String>,

    #[serde(default)]
    pub topics: BTreeSet<String>,

    #[serde(default)]
    pub industries: BTreeSet<String>,

    #[serde(default)]
    pub speakers: BTreeSet<String>,

    #[serde(default)]
    pub keywords: BTreeSet<String>,

    /// Confidence in [0, 1]
    #[serde(default)]
    pub confidence: f32,
}

impl PartialEnrichment {
    /// An empty partial attributed to `source`
    pub fn empty(source: EnrichmentSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Whether this partial carries no signal at all
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.session_type.is_none()
            && self.services.is_empty()
            && self.topics.is_empty()
            && self.industries.is_empty()
            && self.speakers.is_empty()
            && self.keywords.is_empty()
    }

    /// Merge two partials into one
    ///
    /// - scalars come from the higher-confidence side, falling back to the
    ///   other side when the preferred one is `None`; ties prefer `self`
    /// - sets are unioned, de-duplicated case-insensitively
    /// - confidence is the maximum of both
    pub fn combine(self, other: PartialEnrichment) -> PartialEnrichment {
        let self_preferred = self.confidence >= other.confidence;
        let (primary, secondary) = if self_preferred {
            (&self, &other)
        } else {
            (&other, &self)
        };

        let level = primary.level.or(secondary.level);
        let session_type = primary.session_type.or(secondary.session_type);

        let source = match (self.source, other.source) {
            (EnrichmentSource::None, s) | (s, EnrichmentSource::None) => s,
            (a, b) if a == b => a,
            _ => EnrichmentSource::Combined,
        };

        PartialEnrichment {
            source,
            level,
            session_type,
            services: union_case_insensitive(&self.services, &other.services),
            topics: union_case_insensitive(&self.topics, &other.topics),
            industries: union_case_insensitive(&self.industries, &other.industries),
            speakers: union_case_insensitive(&self.speakers, &other.speakers),
            keywords: union_case_insensitive(&self.keywords, &other.keywords),
            confidence: self.confidence.max(other.confidence).clamp(0.0, 1.0),
        }
    }
}

fn union_case_insensitive(a: &BTreeSet<String>, b: &BTreeSet<String>) -> BTreeSet<String> {
    let mut seen = HashSet::new();
    let mut out = BTreeSet::new();
    for value in a.iter().chain(b.iter()) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.insert(trimmed.to_string());
        }
    }
    out
}

/// Consolidated enrichment stored with a video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoEnrichment {
    #[serde(default)]
    pub level: DifficultyLevel,

    #[serde(default)]
    pub session_type: SessionType,

    #[serde(default)]
    pub services: BTreeSet<String>,

    #[serde(default)]
    pub topics: BTreeSet<String>,

    #[serde(default)]
    pub industries: BTreeSet<String>,

    #[serde(default)]
    pub speakers: BTreeSet<String>,

    #[serde(default)]
    pub keywords: BTreeSet<String>,

    #[serde(default)]
    pub source: EnrichmentSource,

    #[serde(default)]
    pub confidence: f32,
}

impl VideoEnrichment {
    /// The single known speaker, if exactly one is known
    pub fn sole_speaker(&self) -> Option<&str> {
        if self.speakers.len() == 1 {
            self.speakers.iter().next().map(String::as_str)
        } else {
            None
        }
    }
}

impl From<PartialEnrichment> for VideoEnrichment {
    fn from(partial: PartialEnrichment) -> Self {
        Self {
            level: partial.level.unwrap_or(DifficultyLevel::Unknown),
            session_type: partial.session_type.unwrap_or(SessionType::Unknown),
            services: partial.services,
            topics: partial.topics,
            industries: partial.industries,
            speakers: partial.speakers,
            keywords: partial.keywords,
            source: partial.source,
            confidence: partial.confidence.clamp(0.0, 1.0),
        }
    }
}
