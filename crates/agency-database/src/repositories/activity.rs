//! Activity log repository. Rows are appended, never updated.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use agency_core::result::AppResult;
use agency_entity::activity::{ActivityLog, NewActivity};

use super::{db_error, new_id};

/// Repository for the audit trail.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an entry on a caller-owned connection.
    pub async fn record(&self, conn: &mut SqliteConnection, entry: &NewActivity) -> AppResult<()> {
        let details = entry.details.as_ref().map(|d| d.to_string());
        sqlx::query(
            "INSERT INTO activity_logs (id, user_id, action, entity_type, entity_id, details, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id())
        .bind(&entry.user_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(details)
        .bind(Utc::now())
        .execute(conn)
        .await
        .map_err(db_error("Failed to record activity"))?;
        Ok(())
    }

    /// Append an entry outside any transaction.
    pub async fn log(&self, entry: &NewActivity) -> AppResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        self.record(&mut conn, entry).await
    }

    /// Newest entries first, optionally for one user.
    pub async fn recent(&self, limit: i64, user_id: Option<&str>) -> AppResult<Vec<ActivityLog>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM activity_logs");
        if let Some(user_id) = user_id {
            query.push(" WHERE user_id = ");
            query.push_bind(user_id.to_string());
        }
        query.push(" ORDER BY created_at DESC, rowid DESC LIMIT ");
        query.push_bind(limit);

        query
            .build_query_as::<ActivityLog>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list activity"))
    }
}
