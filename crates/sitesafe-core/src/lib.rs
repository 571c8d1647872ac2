//! Sitesafe Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared across all Sitesafe components: the record store, the object storage
//! layer, the services and the command-line client.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use auth::{AuthGate, AuthorizedSession, PasswordGate};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, EscalationThresholds, UploadFailurePolicy};
pub use error::{AppError, ErrorKind, ErrorMetadata, LogLevel};
pub use storage_types::{DatabaseBackend, StorageBackend};
// Note: ObjectStorage and StorageError live in the sitesafe-storage crate
