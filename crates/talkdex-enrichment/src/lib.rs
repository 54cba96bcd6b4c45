//! # talkdex Enrichment
//!
//! Derives structured metadata for a talk video: service, topic and industry
//! tags, session type, difficulty level, speakers and keywords.
//!
//! ## Architecture
//!
//! - **extractor**: pure dictionary/pattern extraction ([`KeywordExtractor`])
//! - **adapter**: [`MetadataEnrichmentAdapter`], the `EnrichmentService`
//!   implementation that merges metadata and transcript partials and drives an
//!   optional model backend
//!
//! Enrichment never fails a video outright: missing signal lowers confidence
//! and leaves `Unknown` sentinels in place.

pub mod adapter;
mod dictionaries;
pub mod extractor;

pub use adapter::MetadataEnrichmentAdapter;
pub use extractor::{normalize, KeywordExtractor};

use std::sync::Arc;
use talkdex_config::EnrichmentConfig;
use talkdex_core::enrichment::{EnrichmentBackend, EnrichmentService};

/// Create the enrichment service, optionally backed by a model
pub fn create_enrichment_service(
    config: &EnrichmentConfig,
    backend: Option<Arc<dyn EnrichmentBackend>>,
) -> Arc<dyn EnrichmentService> {
    let adapter = MetadataEnrichmentAdapter::new(config);
    match backend {
        Some(backend) => Arc::new(adapter.with_backend(backend)),
        None => Arc::new(adapter),
    }
}
