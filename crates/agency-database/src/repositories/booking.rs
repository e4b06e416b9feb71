//! Booking repository implementation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use agency_core::result::AppResult;
use agency_core::types::pagination::{PageRequest, PageResponse};
use agency_entity::booking::{Booking, BookingFilter, BookingStatus, NewBooking};

use super::{db_error, new_id};

/// A booking flattened with its flight details, as exported.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookingExportRow {
    pub id: String,
    pub status: BookingStatus,
    pub passenger_name: String,
    pub passenger_passport: Option<String>,
    pub agent_name: String,
    pub flight_number: String,
    pub airline_name: String,
    pub country_code: String,
    pub flight_date: String,
    pub selling_price: i64,
    pub buying_price: i64,
    pub payment_type: String,
    pub partial_amount: Option<i64>,
    pub payment_method: String,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Repository for bookings.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a booking.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        data: &NewBooking,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings
                (id, ticket_id, agent_name, agent_email, agent_phone, passenger_name,
                 passenger_passport, passenger_phone, passenger_email, pax_count, selling_price,
                 payment_type, partial_amount, payment_method, comments, status, created_by,
                 confirmed_at, expires_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(new_id())
        .bind(&data.ticket_id)
        .bind(&data.agent_name)
        .bind(&data.agent_email)
        .bind(&data.agent_phone)
        .bind(&data.passenger_name)
        .bind(&data.passenger_passport)
        .bind(&data.passenger_phone)
        .bind(&data.passenger_email)
        .bind(data.pax_count)
        .bind(data.selling_price)
        .bind(data.payment_type)
        .bind(data.partial_amount)
        .bind(&data.payment_method)
        .bind(&data.comments)
        .bind(data.status)
        .bind(&data.created_by)
        .bind(data.confirmed_at)
        .bind(data.expires_at)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to create booking"))
    }

    /// Find a booking by primary key.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find booking"))
    }

    /// Find a booking by primary key on a caller-owned connection.
    pub async fn find_by_id_in(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_error("Failed to find booking"))
    }

    /// The pending or confirmed booking holding a ticket, if any.
    pub async fn find_active_for_ticket(
        &self,
        conn: &mut SqliteConnection,
        ticket_id: &str,
    ) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE ticket_id = ? AND status IN ('pending', 'confirmed')
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(ticket_id)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to find active booking"))
    }

    /// List bookings, newest first.
    pub async fn list(
        &self,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM bookings WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count bookings"))?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM bookings WHERE 1 = 1");
        push_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC, id LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let items = query
            .build_query_as::<Booking>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list bookings"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Move a booking from `from` to `to`, stamping `confirmed_at` on the
    /// first confirmation only. Confirming drops the hold deadline. Returns `false` if the row was no longer in
    /// `from`.
    pub async fn update_status(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        from: BookingStatus,
        to: BookingStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE bookings SET
                status = ?,
                confirmed_at = CASE WHEN ? = 'confirmed' THEN COALESCE(confirmed_at, ?) ELSE confirmed_at END,
                expires_at = CASE WHEN ? = 'confirmed' THEN NULL ELSE expires_at END,
                updated_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(to)
        .bind(to)
        .bind(now)
        .bind(to)
        .bind(now)
        .bind(id)
        .bind(from)
        .execute(conn)
        .await
        .map_err(db_error("Failed to update booking status"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a booking.
    pub async fn delete(&self, conn: &mut SqliteConnection, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await
            .map_err(db_error("Failed to delete booking"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Pending bookings whose hold window has passed.
    pub async fn overdue_pending(
        &self,
        conn: &mut SqliteConnection,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE status = 'pending' AND expires_at IS NOT NULL AND expires_at <= ?
             ORDER BY expires_at ASC",
        )
        .bind(now)
        .fetch_all(conn)
        .await
        .map_err(db_error("Failed to find overdue bookings"))
    }

    /// Every booking with its flight details, newest first.
    pub async fn export_rows(&self) -> AppResult<Vec<BookingExportRow>> {
        sqlx::query_as::<_, BookingExportRow>(
            "SELECT bk.id, bk.status, bk.passenger_name, bk.passenger_passport, bk.agent_name,
                    t.flight_number, b.airline_name, b.country_code, b.flight_date,
                    bk.selling_price, b.buying_price, bk.payment_type, bk.partial_amount,
                    bk.payment_method, bk.confirmed_at, bk.created_at
             FROM bookings bk
             JOIN tickets t ON t.id = bk.ticket_id
             JOIN ticket_batches b ON b.id = t.batch_id
             ORDER BY bk.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to export bookings"))
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &BookingFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
    if let Some(created_by) = &filter.created_by {
        builder.push(" AND created_by = ");
        builder.push_bind(created_by.clone());
    }
}
