//! Test helpers: services wired over in-memory SQLite and a temporary local store.
//!
//! Run from workspace root: `cargo test -p sitesafe-services`.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime};
use sitesafe_core::models::{NewPersonnelViolation, NewSiteIssue, Severity, ViolationType};
use sitesafe_core::{
    AuthGate, AuthorizedSession, Clock, EscalationThresholds, PasswordGate, UploadFailurePolicy,
};
use sitesafe_db::{ensure_schema, Dialect, RecordStore, SqlRecordRepository};
use sitesafe_services::{
    EvidenceResolver, LocalStorage, ObjectStorage, ReportCompiler, RepeatOffenderAggregator,
    StorageBackend, StorageError, StorageResult, SubmissionService,
};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tempfile::TempDir;

pub const PASSWORD: &str = "site-office-secret";

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Clock the test can move between calls.
#[derive(Clone)]
pub struct TestClock(Arc<Mutex<NaiveDateTime>>);

impl TestClock {
    pub fn on(today: NaiveDate) -> Self {
        Self(Arc::new(Mutex::new(today.and_hms_opt(9, 30, 0).unwrap())))
    }

    pub fn set_day(&self, today: NaiveDate) {
        *self.0.lock().unwrap() = today.and_hms_opt(9, 30, 0).unwrap();
    }
}

impl Clock for TestClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

/// Storage backend that is always down.
pub struct UnavailableStorage;

#[async_trait]
impl ObjectStorage for UnavailableStorage {
    async fn put(&self, key: &str, _data: Bytes, _content_type: &str) -> StorageResult<()> {
        Err(StorageError::UploadFailed(format!("bucket unreachable for {}", key)))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn signed_url(&self, key: &str, _expires_in: Duration) -> StorageResult<String> {
        Err(StorageError::SigningFailed(key.to_string()))
    }

    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

pub struct TestApp {
    pub pool: AnyPool,
    pub store: RecordStore,
    pub clock: TestClock,
    pub storage: Arc<LocalStorage>,
    pub session: AuthorizedSession,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn aggregator(&self) -> RepeatOffenderAggregator {
        RepeatOffenderAggregator::new(self.store.clone(), EscalationThresholds::default())
    }

    pub fn evidence(&self) -> EvidenceResolver {
        EvidenceResolver::new(self.storage.clone(), Arc::new(self.clock.clone()))
    }

    pub fn submissions(&self, policy: UploadFailurePolicy) -> SubmissionService {
        SubmissionService::new(self.store.clone(), self.aggregator(), self.evidence(), policy)
    }

    pub fn submissions_with_storage(
        &self,
        storage: Arc<dyn ObjectStorage>,
        policy: UploadFailurePolicy,
    ) -> SubmissionService {
        let evidence = EvidenceResolver::new(storage, Arc::new(self.clock.clone()));
        SubmissionService::new(self.store.clone(), self.aggregator(), evidence, policy)
    }

    pub fn reports(&self) -> ReportCompiler {
        ReportCompiler::new(self.store.clone(), "Safety Hub")
    }

    /// Files currently held by the local store, as keys.
    pub fn stored_keys(&self) -> Vec<String> {
        fn walk(dir: &std::path::Path, root: &std::path::Path, out: &mut Vec<String>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(&path, root, out);
                } else {
                    let key = path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
                    out.push(key);
                }
            }
        }
        let mut keys = Vec::new();
        walk(self.storage.base_path(), self.storage.base_path(), &mut keys);
        keys.sort();
        keys
    }
}

pub async fn setup_test_app(today: NaiveDate) -> TestApp {
    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    ensure_schema(&pool, Dialect::Sqlite).await.expect("schema");

    let clock = TestClock::on(today);
    let repository = SqlRecordRepository::new(pool.clone(), Dialect::Sqlite);
    let store = RecordStore::new(Arc::new(repository), Arc::new(clock.clone()));

    let temp_dir = TempDir::new().expect("temp dir");
    let storage = LocalStorage::new(
        temp_dir.path().join("evidence"),
        "http://localhost:8080/evidence".to_string(),
    )
    .await
    .expect("local storage");

    let session = PasswordGate::new(PASSWORD, clock.clone())
        .authorize("integration-test", PASSWORD)
        .expect("session");

    TestApp {
        pool,
        store,
        clock,
        storage: Arc::new(storage),
        session,
        _temp_dir: temp_dir,
    }
}

pub fn violation(hard_hat: &str, on: NaiveDate) -> NewPersonnelViolation {
    NewPersonnelViolation {
        created_at: None,
        date_of_event: on,
        hard_hat_number: hard_hat.to_string(),
        company: None,
        trade: None,
        location: None,
        violation_type: ViolationType::Ppe,
        severity: Severity::High,
        description: "No hard hat on site".to_string(),
        corrective_action: None,
        evidence_pointer: None,
    }
}

pub fn site_issue(building: &str, on: NaiveDate) -> NewSiteIssue {
    NewSiteIssue {
        created_at: None,
        date_of_event: on,
        company: "Acme Concrete".to_string(),
        building: building.to_string(),
        floor: "3".to_string(),
        risk_level: Severity::Medium,
        issue: "Open floor penetration near stair 2".to_string(),
        photo_pointer: None,
    }
}
