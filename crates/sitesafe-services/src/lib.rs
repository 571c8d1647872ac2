//! Sitesafe Services Layer
//!
//! This crate is the **business service layer**: it hosts the repeat-offender
//! aggregator, the evidence resolver, the submission flow and the report
//! compiler, and re-exports the storage API so that the command-line client
//! depends on a single service facade. Keep business logic and coordination
//! here; keep argument parsing and output formatting in sitesafe-cli.

pub mod report;
pub mod services;

pub use report::{ReportCompiler, ReportDocument};
pub use services::evidence::{EvidenceResolver, EvidenceUpload};
pub use services::repeat_offender::{OffenderStatus, RepeatOffenderAggregator};
pub use services::submission::{SubmissionReceipt, SubmissionService};
pub use sitesafe_storage::{
    create_storage, LocalStorage, ObjectStorage, StorageBackend, StorageError, StorageResult,
};
#[cfg(feature = "storage-s3")]
pub use sitesafe_storage::S3Storage;
