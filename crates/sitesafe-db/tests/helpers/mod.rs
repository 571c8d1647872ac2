//! Test helpers: an in-memory SQLite record store with a pinned clock.
//!
//! Run from workspace root: `cargo test -p sitesafe-db`.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use sitesafe_core::models::{NewPersonnelViolation, NewSiteIssue, Severity, ViolationType};
use sitesafe_core::{AuthGate, AuthorizedSession, FixedClock, PasswordGate};
use sitesafe_db::{ensure_schema, Dialect, RecordStore, SqlRecordRepository};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

/// A single connection keeps the in-memory database alive for the whole test.
pub async fn memory_pool() -> AnyPool {
    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    ensure_schema(&pool, Dialect::Sqlite)
        .await
        .expect("schema");
    pool
}

pub struct TestStore {
    pub store: RecordStore,
    pub pool: AnyPool,
    pub session: AuthorizedSession,
}

pub async fn setup_store(today: NaiveDate) -> TestStore {
    let pool = memory_pool().await;
    let clock = FixedClock::on(today);
    let repository = SqlRecordRepository::new(pool.clone(), Dialect::Sqlite);
    let store = RecordStore::new(Arc::new(repository), Arc::new(clock));
    let session = PasswordGate::new("site-password", clock)
        .authorize("test-office", "site-password")
        .expect("session");
    TestStore {
        store,
        pool,
        session,
    }
}

pub fn violation(hard_hat: &str, on: NaiveDate) -> NewPersonnelViolation {
    NewPersonnelViolation {
        created_at: None,
        date_of_event: on,
        hard_hat_number: hard_hat.to_string(),
        company: Some("Acme Steel".to_string()),
        trade: Some("Ironworker".to_string()),
        location: Some("Level 3".to_string()),
        violation_type: ViolationType::Ppe,
        severity: Severity::Medium,
        description: "No safety glasses".to_string(),
        corrective_action: None,
        evidence_pointer: None,
    }
}

pub fn site_issue(building: &str, on: NaiveDate) -> NewSiteIssue {
    NewSiteIssue {
        created_at: None,
        date_of_event: on,
        company: "Acme Steel".to_string(),
        building: building.to_string(),
        floor: "2".to_string(),
        risk_level: Severity::High,
        issue: "Missing guardrail at slab edge".to_string(),
        photo_pointer: None,
    }
}
