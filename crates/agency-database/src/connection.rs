//! SQLite connection pool management.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::info;

use agency_core::config::DatabaseConfig;
use agency_core::error::{AppError, ErrorKind};

/// Wrapper around the sqlx SQLite connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    /// The underlying sqlx connection pool.
    pool: SqlitePool,
}

impl DatabasePool {
    /// Open (and optionally create) the database file from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            url = %config.url,
            max_connections = config.max_connections,
            "Opening SQLite database"
        );

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid database URL '{}'", config.url),
                    e,
                )
            })?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(config.connect_timeout_seconds));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to open database: {e}"),
                    e,
                )
            })?;

        info!("SQLite database ready");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool keeps exactly one connection alive for its whole lifetime,
    /// since the data disappears with the connection.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Invalid URL", e))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to open in-memory database", e)
            })?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Return the underlying sqlx pool (consuming self).
    pub fn into_pool(self) -> SqlitePool {
        self.pool
    }

    /// Start a write transaction.
    ///
    /// `BEGIN IMMEDIATE` takes the write lock up front, so a writer waits
    /// out `busy_timeout` instead of failing when a read upgrades to a
    /// write mid-transaction.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(|e| {
            let err = AppError::from(e);
            if err.kind == ErrorKind::Database {
                AppError {
                    message: format!("Failed to start transaction: {}", err.message),
                    ..err
                }
            } else {
                err
            }
        })
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_pool_is_healthy() {
        let db = DatabasePool::in_memory().await.unwrap();
        assert!(db.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_write_lock_contention_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("agency.db").display()),
            max_connections: 2,
            connect_timeout_seconds: 1,
            ..DatabaseConfig::default()
        };
        let db = DatabasePool::connect(&config).await.unwrap();

        let held = db.begin().await.unwrap();
        let err = db.begin().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        held.rollback().await.unwrap();
        let tx = db.begin().await.unwrap();
        tx.commit().await.unwrap();
    }
}
