//! Enrichment Trait Definitions and Domain Types
//!
//! Core defines the traits and merge semantics; the keyword extractor and the
//! adapter that drives an optional model backend live in `talkdex-enrichment`.

pub mod service;
pub mod types;

pub use service::{EnrichmentBackend, EnrichmentService};
pub use types::{DifficultyLevel, EnrichmentSource, PartialEnrichment, SessionType, VideoEnrichment};
