//! Enrichment backend integration tests
//!
//! The adapter consults a model backend first, fills gaps from dictionary
//! extraction, and falls back to dictionary extraction alone when the
//! backend errors.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use talkdex_config::EnrichmentConfig;
use talkdex_core::enrichment::{
    DifficultyLevel, EnrichmentBackend, EnrichmentService, EnrichmentSource, PartialEnrichment,
    SessionType,
};
use talkdex_core::types::VideoRecord;
use talkdex_enrichment::{create_enrichment_service, MetadataEnrichmentAdapter};

// ============================================================================
// Test Backends
// ============================================================================

struct FixedBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl EnrichmentBackend for FixedBackend {
    async fn extract_from_transcript(&self, _text: &str) -> Result<PartialEnrichment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PartialEnrichment {
            source: EnrichmentSource::Model,
            level: Some(DifficultyLevel::Expert),
            topics: ["Databases".to_string()].into_iter().collect(),
            confidence: 0.95,
            ..Default::default()
        })
    }

    async fn extract_from_video_metadata(&self, _video: &VideoRecord) -> Result<PartialEnrichment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PartialEnrichment::empty(EnrichmentSource::Model))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct BrokenBackend;

#[async_trait]
impl EnrichmentBackend for BrokenBackend {
    async fn extract_from_transcript(&self, _text: &str) -> Result<PartialEnrichment> {
        bail!("model quota exceeded")
    }

    async fn extract_from_video_metadata(&self, _video: &VideoRecord) -> Result<PartialEnrichment> {
        bail!("model quota exceeded")
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn talk() -> VideoRecord {
    VideoRecord::new("abc123", "Keynote: the future of DATABASES", "https://www.youtube.com/watch?v=abc123")
        .with_description("Speakers: Priya Raman")
}

// ============================================================================
// TEST: Backend consulted first
// ============================================================================

#[tokio::test]
async fn test_backend_result_wins_and_dictionary_fills_gaps() {
    let backend = Arc::new(FixedBackend {
        calls: AtomicUsize::new(0),
    });
    let adapter = MetadataEnrichmentAdapter::new(&EnrichmentConfig::default()).with_backend(backend.clone());

    let partial = adapter
        .extract_from_transcript("This is a 200-level session on DynamoDB")
        .await;

    // Backend confidence is higher, so its level wins over the dictionary's
    assert_eq!(partial.level, Some(DifficultyLevel::Expert));
    assert!(partial.services.contains("Amazon DynamoDB"));
    assert!(partial.topics.contains("Databases"));
    assert_eq!(partial.source, EnrichmentSource::Combined);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_blank_transcript_skips_backend() {
    let backend = Arc::new(FixedBackend {
        calls: AtomicUsize::new(0),
    });
    let adapter = MetadataEnrichmentAdapter::new(&EnrichmentConfig::default()).with_backend(backend.clone());

    let partial = adapter.extract_from_transcript("   ").await;
    assert!(partial.is_empty());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// TEST: Backend failure degrades, never fails
// ============================================================================

#[tokio::test]
async fn test_broken_backend_falls_back_to_dictionary() {
    let service = create_enrichment_service(&EnrichmentConfig::default(), Some(Arc::new(BrokenBackend)));

    let enrichment = service
        .enrich(&talk(), Some("we migrated our retail platform to Aurora"))
        .await
        .expect("enrichment must not fail on backend errors");

    assert_eq!(enrichment.session_type, SessionType::Keynote);
    assert!(enrichment.services.contains("Amazon Aurora"));
    assert!(enrichment.industries.contains("Retail"));
    assert!(enrichment.topics.contains("Databases"));
    assert_eq!(enrichment.sole_speaker(), Some("Priya Raman"));
    assert!(enrichment.confidence > 0.0);
}

#[tokio::test]
async fn test_service_without_backend() {
    let service = create_enrichment_service(&EnrichmentConfig::default(), None);
    let enrichment = service.enrich(&talk(), None).await.unwrap();

    let expected: BTreeSet<String> = ["Priya Raman".to_string()].into_iter().collect();
    assert_eq!(enrichment.speakers, expected);
    assert_eq!(enrichment.source, EnrichmentSource::VideoMetadata);
    assert_eq!(enrichment.level, DifficultyLevel::Unknown);
}
