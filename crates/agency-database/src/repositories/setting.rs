//! System settings repository.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use agency_core::result::AppResult;
use agency_entity::setting::SystemSetting;

use super::db_error;

/// Repository for the key/value settings table.
#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    /// Create a new settings repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All settings ordered by key.
    pub async fn find_all(&self) -> AppResult<Vec<SystemSetting>> {
        sqlx::query_as::<_, SystemSetting>("SELECT * FROM system_settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to load settings"))
    }

    /// One setting by key.
    pub async fn find(&self, key: &str) -> AppResult<Option<SystemSetting>> {
        sqlx::query_as::<_, SystemSetting>("SELECT * FROM system_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load setting"))
    }

    /// Insert or replace a setting.
    pub async fn upsert(
        &self,
        conn: &mut SqliteConnection,
        key: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO system_settings (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(conn)
        .await
        .map_err(db_error("Failed to save setting"))?;
        Ok(())
    }
}
