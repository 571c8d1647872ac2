use sitesafe_core::models::RecordKind;
use sitesafe_core::AppError;
use sqlx::AnyPool;

use super::dialect::Dialect;

/// Create both record tables when they are missing. Existing tables are left alone.
#[tracing::instrument(skip(pool), fields(db.system = dialect.system(), db.operation = "create_table"))]
pub async fn ensure_schema(pool: &AnyPool, dialect: Dialect) -> Result<(), AppError> {
    for kind in [RecordKind::PersonnelViolation, RecordKind::SiteIssue] {
        sqlx::query(&dialect.create_table(kind))
            .execute(pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, table = kind.table(), "Failed to create table");
                AppError::Database(e)
            })?;
    }
    tracing::debug!("Record tables ready");
    Ok(())
}
