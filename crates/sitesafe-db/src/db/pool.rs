use std::sync::Arc;

use sitesafe_core::{Clock, Config, DatabaseBackend};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use super::dialect::Dialect;
use super::records::{RecordStore, SqlRecordRepository};
use super::schema::ensure_schema;

/// SQLite refuses to create a missing file unless asked to.
fn connection_url(config: &Config) -> String {
    let url = config.database_url.as_str();
    if config.database_backend != DatabaseBackend::Sqlite
        || url.contains(":memory:")
        || url.contains("mode=")
    {
        return url.to_string();
    }
    if url.contains('?') {
        format!("{}&mode=rwc", url)
    } else {
        format!("{}?mode=rwc", url)
    }
}

fn is_in_memory(config: &Config) -> bool {
    config.database_backend == DatabaseBackend::Sqlite
        && config.database_url.contains(":memory:")
}

/// Each in-memory SQLite connection opens its own empty database, so that pool
/// holds exactly one connection and never recycles it.
fn pool_options(config: &Config) -> AnyPoolOptions {
    let options = AnyPoolOptions::new().acquire_timeout(config.db_timeout());
    if is_in_memory(config) {
        options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options.max_connections(config.db_max_connections)
    }
}

pub async fn create_pool(config: &Config) -> anyhow::Result<AnyPool> {
    sqlx::any::install_default_drivers();

    let options = pool_options(config);
    let max_connections = options.get_max_connections();
    let pool = options
        .connect(&connection_url(config))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to {} database: {}", config.database_backend, e))?;

    tracing::info!(
        backend = %config.database_backend,
        max_connections,
        "Database pool created"
    );
    Ok(pool)
}

/// Connect, make sure the tables exist and wrap the repository in the authorized facade.
pub async fn connect(config: &Config, clock: Arc<dyn Clock>) -> anyhow::Result<RecordStore> {
    let pool = create_pool(config).await?;
    let dialect = Dialect::from(config.database_backend);
    ensure_schema(&pool, dialect).await?;
    let repository = SqlRecordRepository::new(pool, dialect);
    Ok(RecordStore::new(Arc::new(repository), clock))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> Config {
        Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(url.to_string()),
            "APP_PASSWORD" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn sqlite_files_are_created_on_demand() {
        assert_eq!(
            connection_url(&config("sqlite://safety.db")),
            "sqlite://safety.db?mode=rwc"
        );
        assert_eq!(
            connection_url(&config("sqlite::memory:")),
            "sqlite::memory:"
        );
        assert_eq!(
            connection_url(&config("postgres://localhost/safety")),
            "postgres://localhost/safety"
        );
    }

    #[test]
    fn in_memory_sqlite_keeps_a_single_connection() {
        let options = pool_options(&config("sqlite::memory:"));
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);

        let file = config("sqlite://safety.db");
        assert_eq!(pool_options(&file).get_max_connections(), file.db_max_connections);
        assert!(file.db_max_connections > 1);
    }
}
