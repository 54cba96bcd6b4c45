//! # talkdex core
//!
//! Domain types and trait definitions shared by every talkdex crate.
//!
//! ## Dependency Inversion
//!
//! Core defines the abstractions; infrastructure crates implement them:
//! - `talkdex-llm` implements [`EmbeddingProvider`]
//! - `talkdex-enrichment` implements [`EnrichmentService`]
//! - `talkdex-sqlite` implements [`SegmentStore`]
//! - `talkdex-pipeline` implements [`VideoSource`] for exported manifests and
//!   drives everything through these traits
//!
//! ## Modules
//!
//! - **types**: videos, raw transcripts, derived segments
//! - **embedding**: the embedding vector newtype and provider trait
//! - **enrichment**: partial/consolidated metadata and the enrichment traits
//! - **source**: the discovery collaborator
//! - **storage**: the storage collaborator, profiles and diagnostics
//! - **error**: the ingestion error taxonomy

pub mod embedding;
pub mod enrichment;
pub mod error;
pub mod source;
pub mod storage;
pub mod types;

pub use embedding::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult, EmbeddingVector};
pub use enrichment::{
    DifficultyLevel, EnrichmentBackend, EnrichmentService, EnrichmentSource, PartialEnrichment,
    SessionType, VideoEnrichment,
};
pub use error::{IngestError, IngestResult, SkipReason};
pub use source::{SourceSelector, VideoSource};
pub use storage::{
    DbStats, IntegrityReport, OptimizeStats, QueryTiming, SegmentStore, StorageError,
    StorageProfile, StorageResult,
};
pub use types::{Transcript, TranscriptSegment, VideoRecord, VideoSegment, UNKNOWN_SPEAKER};
