//! Evidence reference resolver
//!
//! Write side: store an uploaded file under a fresh pointer. Read side: turn a
//! stored pointer into a time-limited link, or nothing.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use sitesafe_core::{AppError, Clock};
use sitesafe_storage::{generate_pointer, ObjectStorage, StorageError};

const DEFAULT_LINK_TTL: Duration = Duration::from_secs(3600);

/// A file supplied with a submission.
#[derive(Debug, Clone)]
pub struct EvidenceUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl EvidenceUpload {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        }
    }
}

fn storage_error(err: StorageError) -> AppError {
    AppError::Storage(err.to_string())
}

#[derive(Clone)]
pub struct EvidenceResolver {
    storage: Arc<dyn ObjectStorage>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl EvidenceResolver {
    pub fn new(storage: Arc<dyn ObjectStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            ttl: DEFAULT_LINK_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Time-limited link for a pointer. `None` for an absent pointer or when
    /// the storage backend cannot sign it.
    pub async fn resolve(&self, pointer: Option<&str>) -> Option<String> {
        let pointer = pointer.map(str::trim).filter(|p| !p.is_empty())?;
        match self.storage.signed_url(pointer, self.ttl).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, pointer = %pointer, "No signed link for evidence");
                None
            }
        }
    }

    /// Store an upload under `folder` and return its new pointer.
    pub async fn store(&self, upload: &EvidenceUpload, folder: &str) -> Result<String, AppError> {
        let pointer = generate_pointer(folder, &upload.filename, self.clock.now());
        let content_type = if upload.content_type.trim().is_empty() {
            "application/octet-stream"
        } else {
            upload.content_type.as_str()
        };
        self.storage
            .put(&pointer, upload.data.clone(), content_type)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, pointer = %pointer, "Evidence upload failed");
                storage_error(e)
            })?;
        Ok(pointer)
    }

    /// Remove an object whose record was never written. Failures are only logged.
    pub async fn discard(&self, pointer: &str) {
        if let Err(e) = self.storage.delete(pointer).await {
            tracing::warn!(error = %e, pointer = %pointer, "Could not remove orphaned evidence");
        }
    }
}
