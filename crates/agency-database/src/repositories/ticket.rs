//! Ticket repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use agency_core::result::AppResult;
use agency_core::types::pagination::{PageRequest, PageResponse};
use agency_entity::ticket::{NewTicket, Ticket, TicketFilter, TicketStatus, TicketView};

use super::{db_error, new_id};

const VIEW_SELECT: &str = "SELECT t.id, t.batch_id, t.flight_number, t.status, t.selling_price,
        b.buying_price, t.aircraft, t.seat_class, t.locked_until, t.sold_by, t.sold_at,
        b.country_code, c.name AS country_name, c.flag AS country_flag,
        b.airline_name, b.flight_date, b.flight_time, t.created_at, t.updated_at
    FROM tickets t
    JOIN ticket_batches b ON b.id = t.batch_id
    LEFT JOIN countries c ON c.code = b.country_code";

/// A ticket status change, applied only if the row is still in `from`.
#[derive(Debug, Clone)]
pub struct StatusChange<'a> {
    pub from: TicketStatus,
    pub to: TicketStatus,
    pub locked_until: Option<DateTime<Utc>>,
    pub sold_by: Option<&'a str>,
    pub now: DateTime<Utc>,
}

/// Repository for individual seats.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the tickets of a batch. Returns the number of rows written.
    pub async fn insert_many(
        &self,
        conn: &mut SqliteConnection,
        tickets: &[NewTicket],
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut written = 0;
        for ticket in tickets {
            let result = sqlx::query(
                "INSERT INTO tickets
                    (id, batch_id, flight_number, status, selling_price, aircraft, seat_class, created_at, updated_at)
                 VALUES (?, ?, ?, 'available', ?, ?, ?, ?, ?)",
            )
            .bind(new_id())
            .bind(&ticket.batch_id)
            .bind(&ticket.flight_number)
            .bind(ticket.selling_price)
            .bind(&ticket.aircraft)
            .bind(&ticket.seat_class)
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await
            .map_err(db_error("Failed to create ticket"))?;
            written += result.rows_affected();
        }
        Ok(written)
    }

    /// Find a ticket by primary key.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find ticket"))
    }

    /// Find a ticket by primary key on a caller-owned connection.
    pub async fn find_by_id_in(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_error("Failed to find ticket"))
    }

    /// Buying price of the ticket's batch.
    pub async fn buying_price(&self, conn: &mut SqliteConnection, id: &str) -> AppResult<Option<i64>> {
        sqlx::query_scalar(
            "SELECT b.buying_price FROM tickets t JOIN ticket_batches b ON b.id = t.batch_id
             WHERE t.id = ?",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to load ticket buying price"))
    }

    /// Load a ticket joined with its batch and country.
    pub async fn find_view(&self, id: &str) -> AppResult<Option<TicketView>> {
        let sql = format!("{VIEW_SELECT} WHERE t.id = ?");
        sqlx::query_as::<_, TicketView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load ticket"))
    }

    /// List tickets matching the filter, ordered by flight date.
    pub async fn list(
        &self,
        filter: &TicketFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<TicketView>> {
        let mut count = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM tickets t JOIN ticket_batches b ON b.id = t.batch_id WHERE 1 = 1",
        );
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count tickets"))?;

        let mut query = QueryBuilder::<Sqlite>::new(VIEW_SELECT);
        query.push(" WHERE 1 = 1");
        push_filters(&mut query, filter);
        query.push(" ORDER BY b.flight_date ASC, t.flight_number ASC LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let items = query
            .build_query_as::<TicketView>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list tickets"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// All tickets of a batch, in flight number order.
    pub async fn list_by_batch(&self, batch_id: &str) -> AppResult<Vec<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE batch_id = ? ORDER BY flight_number ASC",
        )
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list batch tickets"))
    }

    /// Apply a status change if the ticket is still in `change.from`.
    ///
    /// Returns `false` when another writer moved the ticket first.
    /// Moving to `sold` stamps the seller; moving to `available` clears it.
    pub async fn apply_status(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        change: &StatusChange<'_>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE tickets SET
                status = ?,
                locked_until = ?,
                sold_by = CASE ? WHEN 'sold' THEN ? WHEN 'available' THEN NULL ELSE sold_by END,
                sold_at = CASE ? WHEN 'sold' THEN COALESCE(sold_at, ?) WHEN 'available' THEN NULL ELSE sold_at END,
                updated_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(change.to)
        .bind(change.locked_until)
        .bind(change.to)
        .bind(change.sold_by)
        .bind(change.to)
        .bind(change.now)
        .bind(change.now)
        .bind(id)
        .bind(change.from)
        .execute(conn)
        .await
        .map_err(db_error("Failed to update ticket status"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Locked tickets whose window has passed and that no pending booking
    /// holds.
    pub async fn stale_locks(
        &self,
        conn: &mut SqliteConnection,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets t
             WHERE t.status = 'locked' AND t.locked_until IS NOT NULL AND t.locked_until <= ?
               AND NOT EXISTS (
                   SELECT 1 FROM bookings bk WHERE bk.ticket_id = t.id AND bk.status = 'pending'
               )",
        )
        .bind(now)
        .fetch_all(conn)
        .await
        .map_err(db_error("Failed to find stale ticket locks"))
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &TicketFilter) {
    if let Some(country) = &filter.country {
        builder.push(" AND UPPER(b.country_code) = UPPER(");
        builder.push_bind(country.clone());
        builder.push(")");
    }
    if let Some(status) = filter.status {
        builder.push(" AND t.status = ");
        builder.push_bind(status);
    }
    if let Some(airline) = &filter.airline {
        builder.push(" AND LOWER(b.airline_name) = LOWER(");
        builder.push_bind(airline.clone());
        builder.push(")");
    }
}
