//! Object storage port for evidence files

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by an evidence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Evidence upload failed: {0}")]
    UploadFailed(String),

    #[error("Evidence read failed: {0}")]
    DownloadFailed(String),

    #[error("Evidence removal failed: {0}")]
    DeleteFailed(String),

    #[error("No evidence object at {0}")]
    NotFound(String),

    #[error("Invalid evidence pointer: {0}")]
    InvalidKey(String),

    #[error("Could not sign link: {0}")]
    SigningFailed(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage misconfigured: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object storage collaborator for evidence files.
///
/// Keys are opaque pointers produced by `keys::generate_pointer`. Backends
/// never interpret them beyond validating that they stay inside the store.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key`.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Read an object back.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Remove an object. Missing objects are not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Time-limited retrieval link for an object.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;

    fn backend_type(&self) -> StorageBackend;
}
