use chrono::NaiveDateTime;
use sitesafe_core::models::{
    format_date, format_timestamp, NewPersonnelViolation, NewSiteIssue, PersonnelViolation,
    PersonnelViolationRow, RecordId, RecordKind, SiteIssue, SiteIssueRow,
};
use sitesafe_core::AppError;
use sqlx::any::AnyRow;
use sqlx::{Any, AnyPool, FromRow};

use crate::db::dialect::{Dialect, SqlStatement};
use crate::db::query::{Field, RecordQuery};

/// Storage backend for safety records.
///
/// Implementations must return complete results or an error, never a
/// truncated list.
#[async_trait::async_trait]
pub trait RecordRepository: Send + Sync {
    async fn insert_personnel(
        &self,
        record: &NewPersonnelViolation,
        created_at: NaiveDateTime,
    ) -> Result<RecordId, AppError>;

    async fn insert_site(
        &self,
        record: &NewSiteIssue,
        created_at: NaiveDateTime,
    ) -> Result<RecordId, AppError>;

    async fn fetch_personnel(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<PersonnelViolation>, AppError>;

    async fn fetch_site(&self, query: &RecordQuery) -> Result<Vec<SiteIssue>, AppError>;

    async fn count(&self, query: &RecordQuery) -> Result<i64, AppError>;

    async fn distinct(&self, kind: RecordKind, field: Field) -> Result<Vec<String>, AppError>;
}

/// Relational repository over PostgreSQL or SQLite.
#[derive(Clone)]
pub struct SqlRecordRepository {
    pool: AnyPool,
    dialect: Dialect,
}

impl SqlRecordRepository {
    pub fn new(pool: AnyPool, dialect: Dialect) -> Self {
        Self { pool, dialect }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn expect_kind(query: &RecordQuery, kind: RecordKind) -> Result<(), AppError> {
        if query.kind() != kind {
            return Err(AppError::Internal(format!(
                "Expected a {} query, got {}",
                kind,
                query.kind()
            )));
        }
        query.check()
    }

    async fn fetch_rows<R>(&self, stmt: &SqlStatement) -> Result<Vec<R>, AppError>
    where
        R: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        let mut query = sqlx::query_as::<Any, R>(&stmt.sql);
        for value in &stmt.binds {
            query = query.bind(value.clone());
        }
        query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, sql = %stmt.sql, "Record query failed");
            AppError::Database(e)
        })
    }

    async fn insert_values(
        &self,
        kind: RecordKind,
        values: Vec<Option<String>>,
    ) -> Result<RecordId, AppError> {
        let sql = self.dialect.insert(kind);
        let mut query = sqlx::query_scalar::<Any, i64>(&sql);
        for value in values {
            query = query.bind(value);
        }
        let id = query.fetch_one(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, table = kind.table(), "Failed to insert record");
            AppError::Database(e)
        })?;
        Ok(RecordId(id))
    }
}

#[async_trait::async_trait]
impl RecordRepository for SqlRecordRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "personnel_violations", db.operation = "insert"))]
    async fn insert_personnel(
        &self,
        record: &NewPersonnelViolation,
        created_at: NaiveDateTime,
    ) -> Result<RecordId, AppError> {
        // Column order follows Field::columns_of(PersonnelViolation) without id.
        let values = vec![
            Some(format_timestamp(created_at)),
            Some(format_date(record.date_of_event)),
            Some(record.hard_hat_number.clone()),
            record.company.clone(),
            record.trade.clone(),
            record.location.clone(),
            Some(record.violation_type.as_str().to_string()),
            Some(record.severity.as_str().to_string()),
            Some(record.description.clone()),
            record.corrective_action.clone(),
            record.evidence_pointer.clone(),
        ];
        let id = self
            .insert_values(RecordKind::PersonnelViolation, values)
            .await?;
        tracing::debug!(record_id = %id, hard_hat = %record.hard_hat_number, "Personnel violation stored");
        Ok(id)
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "site_issues", db.operation = "insert"))]
    async fn insert_site(
        &self,
        record: &NewSiteIssue,
        created_at: NaiveDateTime,
    ) -> Result<RecordId, AppError> {
        let values = vec![
            Some(format_timestamp(created_at)),
            Some(format_date(record.date_of_event)),
            Some(record.company.clone()),
            Some(record.building.clone()),
            Some(record.floor.clone()),
            Some(record.risk_level.as_str().to_string()),
            Some(record.issue.clone()),
            record.photo_pointer.clone(),
        ];
        let id = self.insert_values(RecordKind::SiteIssue, values).await?;
        tracing::debug!(record_id = %id, building = %record.building, "Site issue stored");
        Ok(id)
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "personnel_violations", db.operation = "select", predicates = query.predicates().len()))]
    async fn fetch_personnel(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<PersonnelViolation>, AppError> {
        Self::expect_kind(query, RecordKind::PersonnelViolation)?;
        let stmt = self.dialect.select(query);
        let rows: Vec<PersonnelViolationRow> = self.fetch_rows(&stmt).await?;
        rows.into_iter().map(PersonnelViolation::try_from).collect()
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "site_issues", db.operation = "select", predicates = query.predicates().len()))]
    async fn fetch_site(&self, query: &RecordQuery) -> Result<Vec<SiteIssue>, AppError> {
        Self::expect_kind(query, RecordKind::SiteIssue)?;
        let stmt = self.dialect.select(query);
        let rows: Vec<SiteIssueRow> = self.fetch_rows(&stmt).await?;
        rows.into_iter().map(SiteIssue::try_from).collect()
    }

    #[tracing::instrument(skip(self, query), fields(db.table = query.kind().table(), db.operation = "count"))]
    async fn count(&self, query: &RecordQuery) -> Result<i64, AppError> {
        query.check()?;
        let stmt = self.dialect.count(query);
        let mut scalar = sqlx::query_scalar::<Any, i64>(&stmt.sql);
        for value in &stmt.binds {
            scalar = scalar.bind(value.clone());
        }
        scalar.fetch_one(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, table = query.kind().table(), "Failed to count records");
            AppError::Database(e)
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = kind.table(), db.operation = "distinct"))]
    async fn distinct(&self, kind: RecordKind, field: Field) -> Result<Vec<String>, AppError> {
        if field == Field::Id || !field.belongs_to(kind) {
            return Err(AppError::Validation(format!(
                "Field {} is not a {} attribute",
                field, kind
            )));
        }
        let stmt = self.dialect.distinct(kind, field);
        sqlx::query_scalar::<Any, String>(&stmt.sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, table = kind.table(), column = field.column(), "Failed to list distinct values");
                AppError::Database(e)
            })
    }
}
