//! Configuration module
//!
//! Configuration is read from the environment (after loading a `.env` file when
//! present). Every setting has a default except the database URL and the
//! application password.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::storage_types::{DatabaseBackend, StorageBackend};

// Common constants
const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 10;
const SIGNED_URL_TTL_SECS: u64 = 3600;
const ESCALATION_TOTAL_THRESHOLD: i64 = 3;
const ESCALATION_RECENT_THRESHOLD: i64 = 2;
const ESCALATION_WINDOW_DAYS: i64 = 30;
const LOCAL_STORAGE_PATH: &str = "./evidence";
const LOCAL_STORAGE_BASE_URL: &str = "http://localhost:8080/evidence";
const APP_TITLE: &str = "Safety Hub";

/// Thresholds for flagging a repeat offender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscalationThresholds {
    /// Escalate when the lifetime count reaches this value.
    pub total: i64,
    /// Escalate when the trailing-window count reaches this value.
    pub recent: i64,
    /// Length of the trailing window in calendar days.
    pub window_days: i64,
}

impl Default for EscalationThresholds {
    fn default() -> Self {
        Self {
            total: ESCALATION_TOTAL_THRESHOLD,
            recent: ESCALATION_RECENT_THRESHOLD,
            window_days: ESCALATION_WINDOW_DAYS,
        }
    }
}

/// What a submission does when its evidence upload fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UploadFailurePolicy {
    /// Abort the submission; nothing is persisted.
    Block,
    /// Persist the record with no evidence pointer.
    #[default]
    Continue,
}

impl FromStr for UploadFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "block" => Ok(UploadFailurePolicy::Block),
            "continue" => Ok(UploadFailurePolicy::Continue),
            _ => Err(anyhow::anyhow!("Invalid upload failure policy: {}", s)),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub app_title: String,
    pub app_password: String,
    // Database configuration
    pub database_url: String,
    pub database_backend: DatabaseBackend,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, Supabase, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub signed_url_ttl_secs: u64,
    // Submission behavior
    pub escalation: EscalationThresholds,
    pub upload_failure_policy: UploadFailurePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let database_backend = match var("DATABASE_BACKEND") {
            Some(value) => value.parse()?,
            None => DatabaseBackend::from_url(&database_url).ok_or_else(|| {
                anyhow::anyhow!(
                    "Cannot infer database backend from DATABASE_URL; set DATABASE_BACKEND"
                )
            })?,
        };

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Local,
        };

        let upload_failure_policy = match var("UPLOAD_FAILURE_POLICY") {
            Some(value) => value.parse()?,
            None => UploadFailurePolicy::default(),
        };

        let escalation = EscalationThresholds {
            total: var("ESCALATION_TOTAL_THRESHOLD")
                .and_then(|s| s.parse().ok())
                .unwrap_or(ESCALATION_TOTAL_THRESHOLD),
            recent: var("ESCALATION_RECENT_THRESHOLD")
                .and_then(|s| s.parse().ok())
                .unwrap_or(ESCALATION_RECENT_THRESHOLD),
            window_days: var("ESCALATION_WINDOW_DAYS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(ESCALATION_WINDOW_DAYS),
        };

        Ok(Config {
            environment,
            app_title: var("APP_TITLE").unwrap_or_else(|| APP_TITLE.to_string()),
            app_password: var("APP_PASSWORD")
                .ok_or_else(|| anyhow::anyhow!("APP_PASSWORD must be set"))?,
            database_url,
            database_backend,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: var("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: var("AWS_REGION"),
            local_storage_path: var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| LOCAL_STORAGE_BASE_URL.to_string()),
            signed_url_ttl_secs: var("SIGNED_URL_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SIGNED_URL_TTL_SECS),
            escalation,
            upload_failure_policy,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }
        if self.signed_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("SIGNED_URL_TTL_SECS must be positive"));
        }
        if self.escalation.total < 1 || self.escalation.recent < 1 {
            return Err(anyhow::anyhow!("Escalation thresholds must be at least 1"));
        }
        if self.escalation.window_days < 0 {
            return Err(anyhow::anyhow!("ESCALATION_WINDOW_DAYS must not be negative"));
        }
        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!("S3_BUCKET must be set for the s3 storage backend"));
            }
            if self.s3_region().is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set for the s3 storage backend"
                ));
            }
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    pub fn db_timeout(&self) -> Duration {
        Duration::from_secs(self.db_timeout_seconds)
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }
}
