//! Authorized facade over a `RecordRepository`
//!
//! Every entry point takes the caller's `AuthorizedSession`. Inserts are
//! normalized and validated first, so an invalid record never reaches the
//! repository, and the creation timestamp comes from the injected clock.

use std::sync::Arc;

use sitesafe_core::models::{
    DateRange, NewPersonnelViolation, NewSiteIssue, PersonnelFilters, PersonnelViolation,
    RecordId, RecordKind, SiteFilters, SiteIssue,
};
use sitesafe_core::{AppError, AuthorizedSession, Clock};

use super::repository::RecordRepository;
use crate::db::query::{Field, RecordQuery};

#[derive(Clone)]
pub struct RecordStore {
    repository: Arc<dyn RecordRepository>,
    clock: Arc<dyn Clock>,
}

impl RecordStore {
    pub fn new(repository: Arc<dyn RecordRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub async fn insert_personnel(
        &self,
        session: &AuthorizedSession,
        record: NewPersonnelViolation,
    ) -> Result<RecordId, AppError> {
        let record = record.into_validated()?;
        let created_at = record.created_at.unwrap_or_else(|| self.clock.now());
        let id = self.repository.insert_personnel(&record, created_at).await?;
        tracing::info!(
            subject = %session.subject(),
            record_id = %id,
            hard_hat = %record.hard_hat_number,
            "Logged personnel violation"
        );
        Ok(id)
    }

    pub async fn insert_site(
        &self,
        session: &AuthorizedSession,
        record: NewSiteIssue,
    ) -> Result<RecordId, AppError> {
        let record = record.into_validated()?;
        let created_at = record.created_at.unwrap_or_else(|| self.clock.now());
        let id = self.repository.insert_site(&record, created_at).await?;
        tracing::info!(
            subject = %session.subject(),
            record_id = %id,
            building = %record.building,
            "Logged site issue"
        );
        Ok(id)
    }

    /// Personnel violations matching every present filter, newest first.
    pub async fn query_personnel(
        &self,
        session: &AuthorizedSession,
        filters: &PersonnelFilters,
    ) -> Result<Vec<PersonnelViolation>, AppError> {
        tracing::debug!(subject = %session.subject(), "Querying personnel violations");
        self.repository
            .fetch_personnel(&RecordQuery::from(filters))
            .await
    }

    /// Site issues matching every present filter, newest first.
    pub async fn query_site(
        &self,
        session: &AuthorizedSession,
        filters: &SiteFilters,
    ) -> Result<Vec<SiteIssue>, AppError> {
        tracing::debug!(subject = %session.subject(), "Querying site issues");
        self.repository.fetch_site(&RecordQuery::from(filters)).await
    }

    /// Personnel violations whose event date falls in the range, newest first.
    pub async fn query_range_personnel(
        &self,
        session: &AuthorizedSession,
        range: &DateRange,
    ) -> Result<Vec<PersonnelViolation>, AppError> {
        tracing::debug!(subject = %session.subject(), start = %range.start(), end = %range.end(), "Personnel range query");
        let query = RecordQuery::new(RecordKind::PersonnelViolation).within(range);
        self.repository.fetch_personnel(&query).await
    }

    pub async fn query_range_site(
        &self,
        session: &AuthorizedSession,
        range: &DateRange,
    ) -> Result<Vec<SiteIssue>, AppError> {
        tracing::debug!(subject = %session.subject(), start = %range.start(), end = %range.end(), "Site range query");
        let query = RecordQuery::new(RecordKind::SiteIssue).within(range);
        self.repository.fetch_site(&query).await
    }

    /// Distinct non-empty values of one attribute, ascending.
    pub async fn distinct(
        &self,
        session: &AuthorizedSession,
        kind: RecordKind,
        field: Field,
    ) -> Result<Vec<String>, AppError> {
        tracing::debug!(subject = %session.subject(), field = %field, "Listing distinct values");
        self.repository.distinct(kind, field).await
    }

    pub async fn count(
        &self,
        session: &AuthorizedSession,
        query: &RecordQuery,
    ) -> Result<i64, AppError> {
        tracing::debug!(subject = %session.subject(), table = query.kind().table(), "Counting records");
        self.repository.count(query).await
    }
}
