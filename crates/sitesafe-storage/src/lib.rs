//! Sitesafe Storage Library
//!
//! Object storage for evidence files attached to safety records. It includes
//! the ObjectStorage trait and implementations for S3 and the local filesystem.
//!
//! # Pointer format
//!
//! All backends share one key layout, generated in the `keys` module:
//!
//! - **Personnel evidence**: `people/{hard_hat}/{YYYYMMDDTHHMMSS}_{uuid}.{ext}`
//! - **Site photos**: `site/{building}/floor_{floor}/{YYYYMMDDTHHMMSS}_{uuid}.{ext}`
//!
//! Keys must not contain `..` segments or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{generate_pointer, personnel_folder, site_folder};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use sitesafe_core::StorageBackend;
pub use traits::{ObjectStorage, StorageError, StorageResult};
