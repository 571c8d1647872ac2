//! Error types module
//!
//! All errors surfaced by the record store, the aggregator, the report compiler and
//! the evidence resolver are unified under `AppError`. Every variant belongs to one
//! `ErrorKind`, which is what callers branch on:
//!
//! - `Validation`: nothing was persisted, the caller re-prompts with the reason.
//! - `Persistence`: the backing store was unreachable or rejected the operation.
//! - `Storage`: evidence upload or link signing failed.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::error::Error as StdError;
use std::io;

use chrono::NaiveDate;
#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Error taxonomy seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Persistence,
    Storage,
    Unauthorized,
    Internal,
}

/// Metadata for user-facing error presentation
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "PERSISTENCE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message. Persistence and storage failures get a generic message.
    fn client_message(&self) -> String;

    /// Raw diagnostic for support escalation, including the underlying cause.
    fn diagnostic(&self) -> String;

    /// Whether details should be hidden from the user
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report rendering error: {0}")]
    Report(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) | AppError::InvalidRange { .. } => ErrorKind::Validation,
            AppError::Database(_) | AppError::Persistence(_) => ErrorKind::Persistence,
            AppError::Storage(_) => ErrorKind::Storage,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Config(_)
            | AppError::Report(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => ErrorKind::Internal,
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut reasons: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        reasons.sort();
        AppError::Validation(reasons.join("; "))
    }
}

/// Static metadata for each variant: (error_code, suggested_action, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, Option<&'static str>, bool, LogLevel) {
    match err {
        AppError::Validation(_) => (
            "VALIDATION_ERROR",
            Some("Complete the required fields and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidRange { .. } => (
            "INVALID_RANGE",
            Some("Choose a start date on or before the end date"),
            false,
            LogLevel::Debug,
        ),
        AppError::Database(_) | AppError::Persistence(_) => (
            "PERSISTENCE_ERROR",
            Some("Try again later or contact support with the diagnostic"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            "STORAGE_ERROR",
            Some("Try again later or contact support with the diagnostic"),
            true,
            LogLevel::Error,
        ),
        AppError::Unauthorized(_) => ("UNAUTHORIZED", Some("Log in again"), false, LogLevel::Warn),
        AppError::Config(_) => (
            "CONFIGURATION_ERROR",
            Some("Check the environment configuration"),
            true,
            LogLevel::Error,
        ),
        AppError::Report(_) | AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            "INTERNAL_ERROR",
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).1
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(ref msg) => msg.clone(),
            AppError::InvalidRange { start, end } => {
                format!("Start date {} must not be after end date {}", start, end)
            }
            AppError::Database(_) | AppError::Persistence(_) => {
                "Failed to save or load safety records".to_string()
            }
            AppError::Storage(_) => "Failed to store or retrieve evidence".to_string(),
            AppError::Unauthorized(_) => "Not authorized".to_string(),
            AppError::Config(_) => "Application is misconfigured".to_string(),
            AppError::Report(_) | AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "An internal error occurred".to_string()
            }
        }
    }

    fn diagnostic(&self) -> String {
        let mut out = self.to_string();
        let mut source = StdError::source(self);
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = StdError::source(cause);
        }
        out
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
        assert_eq!(err.client_message(), "Failed to save or load safety records");
        assert!(err.diagnostic().contains("Database error"));
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_validation() {
        let err = AppError::Validation("Description is required".to_string());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.client_message(), "Description is required");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_invalid_range_is_validation() {
        let err = AppError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.error_code(), "INVALID_RANGE");
        assert!(err.client_message().contains("2024-03-02"));
    }

    #[test]
    fn test_storage_error_hides_details() {
        let err = AppError::Storage("bucket evidence-prod: access denied".to_string());
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(!err.client_message().contains("access denied"));
        assert!(err.diagnostic().contains("access denied"));
    }

    #[test]
    fn test_diagnostic_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("connection refused").context("connect"));
        assert!(err.diagnostic().contains("connect"));
    }
}
