//! Umrah package repository.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use agency_core::result::AppResult;
use agency_core::types::pagination::{PageRequest, PageResponse};
use agency_entity::umrah::{
    UmrahPaymentInput, UmrahTransportInput, UmrahWithTransport, UmrahWithoutTransport,
};

use super::{db_error, new_id};

/// Repository for both Umrah package tables.
#[derive(Debug, Clone)]
pub struct UmrahRepository {
    pool: SqlitePool,
}

impl UmrahRepository {
    /// Create a new Umrah repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ── With transport ──────────────────────────────────────────────

    /// List transport packages by departure date.
    pub async fn list_with_transport(
        &self,
        page: &PageRequest,
    ) -> AppResult<PageResponse<UmrahWithTransport>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM umrah_with_transport")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count Umrah records"))?;

        let items = sqlx::query_as::<_, UmrahWithTransport>(
            "SELECT * FROM umrah_with_transport
             ORDER BY departure_date DESC, created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list Umrah records"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Find a transport package.
    pub async fn find_with_transport(&self, id: &str) -> AppResult<Option<UmrahWithTransport>> {
        sqlx::query_as::<_, UmrahWithTransport>("SELECT * FROM umrah_with_transport WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find Umrah record"))
    }

    /// Insert a transport package.
    pub async fn create_with_transport(
        &self,
        input: &UmrahTransportInput,
        created_by: &str,
    ) -> AppResult<UmrahWithTransport> {
        let now = Utc::now();
        sqlx::query_as::<_, UmrahWithTransport>(
            "INSERT INTO umrah_with_transport
                (id, passenger_name, pnr, passport_number, mobile, agent_name, departure_date,
                 return_date, transport_type, transport_from, transport_to, remarks, created_by,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(new_id())
        .bind(&input.passenger_name)
        .bind(&input.pnr)
        .bind(&input.passport_number)
        .bind(&input.mobile)
        .bind(&input.agent_name)
        .bind(&input.departure_date)
        .bind(&input.return_date)
        .bind(&input.transport_type)
        .bind(&input.transport_from)
        .bind(&input.transport_to)
        .bind(&input.remarks)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create Umrah record"))
    }

    /// Replace the fields of a transport package.
    pub async fn update_with_transport(
        &self,
        id: &str,
        input: &UmrahTransportInput,
    ) -> AppResult<Option<UmrahWithTransport>> {
        sqlx::query_as::<_, UmrahWithTransport>(
            "UPDATE umrah_with_transport SET
                passenger_name = ?, pnr = ?, passport_number = ?, mobile = ?, agent_name = ?,
                departure_date = ?, return_date = ?, transport_type = ?, transport_from = ?,
                transport_to = ?, remarks = ?, updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&input.passenger_name)
        .bind(&input.pnr)
        .bind(&input.passport_number)
        .bind(&input.mobile)
        .bind(&input.agent_name)
        .bind(&input.departure_date)
        .bind(&input.return_date)
        .bind(&input.transport_type)
        .bind(&input.transport_from)
        .bind(&input.transport_to)
        .bind(&input.remarks)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update Umrah record"))
    }

    /// Delete a transport package.
    pub async fn delete_with_transport(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM umrah_with_transport WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete Umrah record"))?;
        Ok(result.rows_affected() > 0)
    }

    // ── Without transport ───────────────────────────────────────────

    /// List payment-tracked packages by departure date.
    pub async fn list_without_transport(
        &self,
        page: &PageRequest,
    ) -> AppResult<PageResponse<UmrahWithoutTransport>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM umrah_without_transport")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count Umrah records"))?;

        let items = sqlx::query_as::<_, UmrahWithoutTransport>(
            "SELECT * FROM umrah_without_transport
             ORDER BY departure_date DESC, created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list Umrah records"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Find a payment-tracked package.
    pub async fn find_without_transport(
        &self,
        id: &str,
    ) -> AppResult<Option<UmrahWithoutTransport>> {
        sqlx::query_as::<_, UmrahWithoutTransport>(
            "SELECT * FROM umrah_without_transport WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find Umrah record"))
    }

    /// Find a payment-tracked package on a caller-owned connection.
    pub async fn find_without_transport_in(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> AppResult<Option<UmrahWithoutTransport>> {
        sqlx::query_as::<_, UmrahWithoutTransport>(
            "SELECT * FROM umrah_without_transport WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to find Umrah record"))
    }

    /// Insert a payment-tracked package.
    pub async fn create_without_transport(
        &self,
        input: &UmrahPaymentInput,
        created_by: &str,
    ) -> AppResult<UmrahWithoutTransport> {
        let now = Utc::now();
        let remaining = UmrahWithoutTransport::remaining(input.total_amount, input.amount_paid);
        sqlx::query_as::<_, UmrahWithoutTransport>(
            "INSERT INTO umrah_without_transport
                (id, passenger_name, pnr, passport_number, mobile, agent_name, departure_date,
                 return_date, total_amount, amount_paid, remaining_amount, remarks, created_by,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(new_id())
        .bind(&input.passenger_name)
        .bind(&input.pnr)
        .bind(&input.passport_number)
        .bind(&input.mobile)
        .bind(&input.agent_name)
        .bind(&input.departure_date)
        .bind(&input.return_date)
        .bind(input.total_amount)
        .bind(input.amount_paid)
        .bind(remaining)
        .bind(&input.remarks)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create Umrah record"))
    }

    /// Replace the fields of a payment-tracked package and recompute the
    /// remaining amount.
    pub async fn update_without_transport(
        &self,
        id: &str,
        input: &UmrahPaymentInput,
    ) -> AppResult<Option<UmrahWithoutTransport>> {
        let remaining = UmrahWithoutTransport::remaining(input.total_amount, input.amount_paid);
        sqlx::query_as::<_, UmrahWithoutTransport>(
            "UPDATE umrah_without_transport SET
                passenger_name = ?, pnr = ?, passport_number = ?, mobile = ?, agent_name = ?,
                departure_date = ?, return_date = ?, total_amount = ?, amount_paid = ?,
                remaining_amount = ?, remarks = ?, updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&input.passenger_name)
        .bind(&input.pnr)
        .bind(&input.passport_number)
        .bind(&input.mobile)
        .bind(&input.agent_name)
        .bind(&input.departure_date)
        .bind(&input.return_date)
        .bind(input.total_amount)
        .bind(input.amount_paid)
        .bind(remaining)
        .bind(&input.remarks)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update Umrah record"))
    }

    /// Store the totals after an instalment.
    pub async fn record_payment(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        amount_paid: i64,
        remaining_amount: i64,
        payment_date: &str,
    ) -> AppResult<UmrahWithoutTransport> {
        sqlx::query_as::<_, UmrahWithoutTransport>(
            "UPDATE umrah_without_transport SET
                amount_paid = ?, remaining_amount = ?, last_payment_date = ?, updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(amount_paid)
        .bind(remaining_amount)
        .bind(payment_date)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to record Umrah payment"))
    }

    /// Delete a payment-tracked package.
    pub async fn delete_without_transport(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM umrah_without_transport WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete Umrah record"))?;
        Ok(result.rows_affected() > 0)
    }
}
