//! Dictionary and pattern extraction
//!
//! Pure, synchronous extraction of tags, session format, level, speakers and
//! keywords from free text. Never fails: text without signal yields a
//! low-confidence partial.

use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;
use tracing::debug;

use talkdex_config::EnrichmentConfig;
use talkdex_core::enrichment::{DifficultyLevel, EnrichmentSource, PartialEnrichment, SessionType};

use crate::dictionaries::{INDUSTRIES, LEVEL_PHRASES, SERVICES, SESSION_TYPES, STOPWORDS, TOPICS};

static SESSION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]{2,4})-?(\d{3})(?:-[A-Z0-9]{1,2})?\b").expect("valid regex")
});

static LEVEL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:level\s*([1-4])00|([1-4])00[\s-]*level)\b").expect("valid regex")
});

static NAME_INTRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[Mm]y name is ([A-Z][\w'-]+(?: [A-Z][\w'-]+){0,2})").expect("valid regex")
});

static IM_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bI(?:'m|’m| am) ([A-Z][\w'-]+(?: [A-Z][\w'-]+){0,2}),? (?:from|with|and I)\b")
        .expect("valid regex")
});

static SPEAKERS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:speakers?|presenters?|presented by)\s*:\s*(.+)$").expect("valid regex")
});

/// Base confidence for text that carried no recognised signal
const BASE_CONFIDENCE: f32 = 0.2;
const CONFIDENCE_PER_SIGNAL: f32 = 0.1;
const MAX_CONFIDENCE: f32 = 0.9;

/// Rule-based extractor over the built-in term tables
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    max_keywords: usize,
    min_keyword_len: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(&EnrichmentConfig::default())
    }
}

impl KeywordExtractor {
    pub fn new(config: &EnrichmentConfig) -> Self {
        Self {
            max_keywords: config.max_keywords,
            min_keyword_len: config.min_keyword_len.max(1),
        }
    }

    /// Extract everything recognisable from `text`, attributed to `source`
    ///
    /// Blank text yields an empty partial with source `None` and confidence 0.
    pub fn extract(&self, text: &str, source: EnrichmentSource) -> PartialEnrichment {
        if text.trim().is_empty() {
            return PartialEnrichment::empty(EnrichmentSource::None);
        }

        let normalized = normalize(text);
        let padded = format!(" {} ", normalized);

        let services = match_terms(&padded, SERVICES);
        let topics = match_terms(&padded, TOPICS);
        let industries = match_terms(&padded, INDUSTRIES);
        let session_type = detect_session_type(text, &padded);
        let level = detect_level(text, &padded);
        let speakers = detect_speakers(text);
        let keywords = self.top_keywords(&normalized);

        let signals = usize::from(level.is_some())
            + usize::from(session_type.is_some())
            + services.len()
            + topics.len()
            + industries.len()
            + speakers.len();
        let confidence = (BASE_CONFIDENCE + CONFIDENCE_PER_SIGNAL * signals as f32).min(MAX_CONFIDENCE);

        debug!(
            source = %source,
            signals,
            services = services.len(),
            topics = topics.len(),
            speakers = speakers.len(),
            "Extracted enrichment signals"
        );

        PartialEnrichment {
            source,
            level,
            session_type,
            services,
            topics,
            industries,
            speakers,
            keywords,
            confidence,
        }
    }

    /// Most frequent non-stopword terms, ties broken alphabetically
    pub fn top_keywords(&self, normalized: &str) -> BTreeSet<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in normalized.split_whitespace() {
            if word.chars().count() < self.min_keyword_len
                || !word.chars().any(char::is_alphabetic)
                || STOPWORDS.contains(&word)
            {
                continue;
            }
            *counts.entry(word).or_default() += 1;
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
            .into_iter()
            .take(self.max_keywords)
            .map(|(word, _)| word.to_string())
            .collect()
    }
}

/// Lowercase, punctuation to spaces, whitespace collapsed
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn match_terms(padded: &str, table: &[(&str, &str)]) -> BTreeSet<String> {
    table
        .iter()
        .filter(|(term, _)| padded.contains(&format!(" {} ", term)))
        .map(|(_, canonical)| canonical.to_string())
        .collect()
}

fn detect_session_type(text: &str, padded: &str) -> Option<SessionType> {
    let from_code = SESSION_CODE
        .captures_iter(text)
        .find(|caps| &caps[1] == "KEY")
        .map(|_| SessionType::Keynote);
    if from_code.is_some() {
        return from_code;
    }
    SESSION_TYPES
        .iter()
        .find(|(term, _)| padded.contains(&format!(" {} ", term)))
        .and_then(|(_, name)| name.parse().ok())
}

fn detect_level(text: &str, padded: &str) -> Option<DifficultyLevel> {
    let from_code = SESSION_CODE
        .find_iter(text)
        .map(|m| DifficultyLevel::from_session_code(m.as_str()))
        .find(DifficultyLevel::is_known);
    if from_code.is_some() {
        return from_code;
    }

    let from_number = LEVEL_NUMBER.captures(text).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map(|digit| DifficultyLevel::from_level_number(digit * 100))
    });
    if from_number.is_some() {
        return from_number;
    }

    LEVEL_PHRASES
        .iter()
        .find(|(phrase, _)| padded.contains(&format!(" {} ", phrase)))
        .map(|(_, level)| DifficultyLevel::from_level_number(*level))
}

fn detect_speakers(text: &str) -> BTreeSet<String> {
    let mut speakers = BTreeSet::new();

    for caps in NAME_INTRO.captures_iter(text).chain(IM_FROM.captures_iter(text)) {
        speakers.insert(caps[1].trim().to_string());
    }

    for caps in SPEAKERS_LINE.captures_iter(text) {
        for name in caps[1].split([',', '&', ';']).flat_map(|part| part.split(" and ")) {
            let name = name.trim().trim_end_matches('.');
            let words = name.split_whitespace().count();
            if (1..=4).contains(&words) && name.starts_with(|c: char| c.is_uppercase()) {
                speakers.insert(name.to_string());
            }
        }
    }

    speakers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> KeywordExtractor {
        KeywordExtractor::default()
    }

    #[test]
    fn test_blank_text_has_no_signal() {
        let partial = extractor().extract("   \n", EnrichmentSource::Transcript);
        assert!(partial.is_empty());
        assert_eq!(partial.confidence, 0.0);
        assert_eq!(partial.source, EnrichmentSource::None);
    }

    #[test]
    fn test_text_without_dictionary_hits_gets_base_confidence() {
        let partial = extractor().extract("the weather was lovely yesterday", EnrichmentSource::Transcript);
        assert_eq!(partial.source, EnrichmentSource::Transcript);
        assert!((partial.confidence - BASE_CONFIDENCE).abs() < f32::EPSILON);
        assert!(partial.services.is_empty());
    }

    #[test]
    fn test_services_topics_industries() {
        let text = "Today we build serverless apps on Lambda and DynamoDB with Step Functions \
                    for a healthcare customer.";
        let partial = extractor().extract(text, EnrichmentSource::Transcript);
        assert!(partial.services.contains("AWS Lambda"));
        assert!(partial.services.contains("Amazon DynamoDB"));
        assert!(partial.services.contains("AWS Step Functions"));
        assert!(partial.topics.contains("Serverless"));
        assert!(partial.industries.contains("Healthcare"));
        // 3 services + 1 topic + 1 industry
        assert!((partial.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_terms_match_whole_words_only() {
        let partial = extractor().extract("Ideas3 and glueing things", EnrichmentSource::Transcript);
        assert!(partial.services.is_empty());
    }

    #[test]
    fn test_confidence_is_capped() {
        let text = "serverless security containers observability analytics networking devops \
                    migration streaming architecture lambda s3 ec2";
        let partial = extractor().extract(text, EnrichmentSource::Transcript);
        assert!((partial.confidence - MAX_CONFIDENCE).abs() < 1e-6);
    }

    #[test]
    fn test_level_and_type_from_session_code() {
        let partial = extractor().extract(
            "AWS re:Invent 2024 - Building resilient systems (ARC301)",
            EnrichmentSource::VideoMetadata,
        );
        assert_eq!(partial.level, Some(DifficultyLevel::Advanced));

        let keynote = extractor().extract("Keynote with the CEO (KEY001)", EnrichmentSource::VideoMetadata);
        assert_eq!(keynote.session_type, Some(SessionType::Keynote));
        assert_eq!(keynote.level, None);
    }

    #[test]
    fn test_level_from_phrases() {
        let partial = extractor().extract("A deep dive into Aurora internals", EnrichmentSource::VideoMetadata);
        assert_eq!(partial.level, Some(DifficultyLevel::Advanced));

        let partial = extractor().extract("This is a 200-level session", EnrichmentSource::Transcript);
        assert_eq!(partial.level, Some(DifficultyLevel::Intermediate));
    }

    #[test]
    fn test_session_type_phrases() {
        let partial = extractor().extract("Chalk talk: designing multi-tenant SaaS", EnrichmentSource::VideoMetadata);
        assert_eq!(partial.session_type, Some(SessionType::ChalkTalk));
    }

    #[test]
    fn test_speaker_introductions() {
        let text = "Hi everyone, my name is Jane Doe. And I'm Raj Patel from Acme Corp.";
        let partial = extractor().extract(text, EnrichmentSource::Transcript);
        assert!(partial.speakers.contains("Jane Doe"));
        assert!(partial.speakers.contains("Raj Patel"));
        assert_eq!(partial.speakers.len(), 2);
    }

    #[test]
    fn test_speakers_line_in_description() {
        let text = "Learn about caching.\nSpeakers: Ana Lima, Tom Berg and Kai Wu";
        let partial = extractor().extract(text, EnrichmentSource::VideoMetadata);
        let expected: BTreeSet<String> = ["Ana Lima", "Kai Wu", "Tom Berg"].iter().map(|s| s.to_string()).collect();
        assert_eq!(partial.speakers, expected);
    }

    #[test]
    fn test_top_keywords_frequency_and_stopwords() {
        let config = EnrichmentConfig {
            max_keywords: 2,
            min_keyword_len: 4,
        };
        let extractor = KeywordExtractor::new(&config);
        let keywords = extractor.top_keywords(&normalize(
            "cache cache cache index index that that that that data",
        ));
        let expected: BTreeSet<String> = ["cache", "index"].iter().map(|s| s.to_string()).collect();
        assert_eq!(keywords, expected);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Event-Driven, CI/CD!  "), "event driven ci cd");
    }
}
