//! Service wiring for the command-line client

use std::sync::Arc;

use anyhow::Context;
use sitesafe_core::{AuthGate, AuthorizedSession, Config, PasswordGate, SystemClock};
use sitesafe_db::{connect, RecordStore};
use sitesafe_services::{
    create_storage, EvidenceResolver, ReportCompiler, RepeatOffenderAggregator, SubmissionService,
};

/// Everything a command needs, built once per invocation.
pub struct AppState {
    pub store: RecordStore,
    pub aggregator: RepeatOffenderAggregator,
    pub evidence: EvidenceResolver,
    pub submissions: SubmissionService,
    pub reports: ReportCompiler,
    gate: PasswordGate<SystemClock>,
}

impl AppState {
    /// Check the caller's password and mint the session used for this run.
    pub fn login(&self, subject: &str, password: &str) -> anyhow::Result<AuthorizedSession> {
        self.gate
            .authorize(subject, password)
            .context("Login rejected")
    }
}

/// Connect the record store and object storage, then build the services.
pub async fn initialize_services(config: &Config) -> anyhow::Result<AppState> {
    let clock = Arc::new(SystemClock);

    let store = connect(config, clock.clone())
        .await
        .context("Failed to open record store")?;

    let storage = create_storage(config)
        .await
        .context("Failed to initialize evidence storage")?;

    let aggregator = RepeatOffenderAggregator::new(store.clone(), config.escalation);
    let evidence = EvidenceResolver::new(storage, clock).with_ttl(config.signed_url_ttl());
    let submissions = SubmissionService::new(
        store.clone(),
        aggregator.clone(),
        evidence.clone(),
        config.upload_failure_policy,
    );
    let reports = ReportCompiler::new(store.clone(), config.app_title.clone());

    Ok(AppState {
        store,
        aggregator,
        evidence,
        submissions,
        reports,
        gate: PasswordGate::new(config.app_password.clone(), SystemClock),
    })
}
