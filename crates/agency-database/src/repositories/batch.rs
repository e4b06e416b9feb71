//! Ticket batch repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use agency_core::result::AppResult;
use agency_core::types::pagination::{PageRequest, PageResponse};
use agency_entity::batch::{BatchSummary, CreateBatch, TicketBatch, UpdateBatch};

use super::{db_error, new_id};

const SUMMARY_SELECT: &str = "SELECT b.*, c.name AS country_name,
        COALESCE(SUM(CASE WHEN t.status = 'sold' THEN 1 ELSE 0 END), 0) AS sold,
        COALESCE(SUM(CASE WHEN t.status = 'available' THEN 1 ELSE 0 END), 0) AS available,
        COALESCE(SUM(CASE WHEN t.status = 'locked' THEN 1 ELSE 0 END), 0) AS locked,
        COALESCE(SUM(CASE WHEN t.status = 'booked' THEN 1 ELSE 0 END), 0) AS booked
    FROM ticket_batches b
    LEFT JOIN countries c ON c.code = b.country_code
    LEFT JOIN tickets t ON t.batch_id = b.id";

/// Repository for wholesale purchases.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    pool: SqlitePool,
}

impl BatchRepository {
    /// Create a new batch repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the batch row. Tickets are inserted separately on the same
    /// transaction.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        data: &CreateBatch,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> AppResult<TicketBatch> {
        sqlx::query_as::<_, TicketBatch>(
            "INSERT INTO ticket_batches
                (id, country_code, airline_name, flight_date, flight_time, buying_price, quantity,
                 agent_name, agent_contact, agent_address, remarks, created_by, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(new_id())
        .bind(&data.country_code)
        .bind(&data.airline_name)
        .bind(&data.flight_date)
        .bind(&data.flight_time)
        .bind(data.buying_price)
        .bind(data.quantity)
        .bind(&data.agent_name)
        .bind(&data.agent_contact)
        .bind(&data.agent_address)
        .bind(&data.remarks)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to create ticket batch"))
    }

    /// Find a batch by primary key.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<TicketBatch>> {
        sqlx::query_as::<_, TicketBatch>("SELECT * FROM ticket_batches WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find ticket batch"))
    }

    /// List batches, newest first, with their ticket status counts.
    pub async fn list_summaries(&self, page: &PageRequest) -> AppResult<PageResponse<BatchSummary>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ticket_batches")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count ticket batches"))?;

        let sql = format!(
            "{SUMMARY_SELECT} GROUP BY b.id ORDER BY b.created_at DESC, b.id LIMIT ? OFFSET ?"
        );
        let items = sqlx::query_as::<_, BatchSummary>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list ticket batches"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// One batch with its ticket status counts.
    pub async fn find_summary(&self, id: &str) -> AppResult<Option<BatchSummary>> {
        let sql = format!("{SUMMARY_SELECT} WHERE b.id = ? GROUP BY b.id");
        sqlx::query_as::<_, BatchSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load ticket batch"))
    }

    /// Update agent and remarks metadata.
    pub async fn update(&self, id: &str, data: &UpdateBatch) -> AppResult<Option<TicketBatch>> {
        sqlx::query_as::<_, TicketBatch>(
            "UPDATE ticket_batches SET
                agent_name = COALESCE(?, agent_name),
                agent_contact = COALESCE(?, agent_contact),
                agent_address = COALESCE(?, agent_address),
                remarks = COALESCE(?, remarks),
                updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&data.agent_name)
        .bind(&data.agent_contact)
        .bind(&data.agent_address)
        .bind(&data.remarks)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update ticket batch"))
    }

    /// Number of tickets of the batch that are held or sold.
    pub async fn count_committed_tickets(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets WHERE batch_id = ? AND status <> 'available'",
        )
        .bind(id)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to count batch tickets"))
    }

    /// Delete a batch and, through the foreign key cascade, its tickets.
    pub async fn delete(&self, conn: &mut SqliteConnection, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM ticket_batches WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await
            .map_err(db_error("Failed to delete ticket batch"))?;
        Ok(result.rows_affected() > 0)
    }
}
