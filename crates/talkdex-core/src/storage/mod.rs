//! Storage collaborator
//!
//! The [`SegmentStore`] trait is what the orchestrator commits batches to.
//! `talkdex-sqlite` provides the production implementation.

pub mod error;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::{DbStats, IntegrityReport, OptimizeStats, QueryTiming, SegmentStore, StorageProfile};
