//! Pipeline Orchestration Layer
//!
//! This crate ties the talkdex components together into the batch ingestion
//! run.
//!
//! ## Architecture
//!
//! Per video, in order:
//! 1. **Extract**: fetch the transcript from the [`VideoSource`](talkdex_core::VideoSource)
//! 2. **Enrich**: derive structured metadata through the `EnrichmentService`
//! 3. **Segment**: split the transcript with the [`SegmentBuilder`]
//! 4. **Embed**: one batched `EmbeddingGenerator` call for all segments
//! 5. **Queue**: add to the current batch; full batches are committed to the
//!    `SegmentStore` in one transaction
//!
//! After the last batch the store is optimised and verified once.
//!
//! Infrastructure crates do not orchestrate:
//! - `talkdex-llm`: embedding generation
//! - `talkdex-enrichment`: metadata extraction
//! - `talkdex-sqlite`: storage
//!
//! ## Usage
//!
//! ```rust,ignore
//! use talkdex_pipeline::{IngestionOrchestrator, ManifestSource};
//!
//! let source = Arc::new(ManifestSource::load("videos.json").await?);
//! let orchestrator = IngestionOrchestrator::new(&store, source, enrichment, generator, config.pipeline);
//! let report = orchestrator.run(&SourceSelector::All, &CancellationToken::new()).await;
//! ```

pub mod manifest;
pub mod orchestrator;
pub mod report;
pub mod segments;

pub use manifest::{ManifestEntry, ManifestSource};
pub use orchestrator::IngestionOrchestrator;
pub use report::{IngestReport, VideoStage};
pub use segments::SegmentBuilder;

pub use tokio_util::sync::CancellationToken;
