use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Database pool has not been initialized")]
    NotInitialized,

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DatabaseError {
    /// Classify a sqlx error, lifting unique-constraint hits out of the generic case
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return DatabaseError::UniqueViolation(constraint);
            }
        }
        DatabaseError::Sqlx(err)
    }
}

static POOL: OnceLock<PgPool> = OnceLock::new();

/// Owner of the process-wide connection pool. Initialized once at startup,
/// closed at shutdown; only the Postgres store reads it.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect and install the global pool. A second call is a no-op.
    pub async fn init(config: &DatabaseConfig) -> Result<(), DatabaseError> {
        if POOL.get().is_some() {
            return Ok(());
        }

        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected database pool: {}", Self::redacted_url(url)?);

        if POOL.set(pool).is_err() {
            tracing::debug!("Database pool was initialized concurrently; keeping the first one");
        }
        Ok(())
    }

    /// Get the global pool
    pub fn pool() -> Result<&'static PgPool, DatabaseError> {
        POOL.get().ok_or(DatabaseError::NotInitialized)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(Self::pool()?).await?;
        Ok(())
    }

    /// Apply the bundled migrations
    pub async fn migrate() -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(Self::pool()?).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close() {
        if let Some(pool) = POOL.get() {
            pool.close().await;
            info!("Closed database pool");
        }
    }

    /// Database URL with the password masked, for logs
    pub fn redacted_url(raw: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("****"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }

    /// Quote SQL identifier to prevent injection
    pub fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
