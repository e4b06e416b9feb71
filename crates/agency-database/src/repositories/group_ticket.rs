//! Group Umrah ticket repository.
//!
//! `remaining_tickets` is never stored: every read derives it from the
//! assignment rows.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use agency_core::result::AppResult;
use agency_entity::umrah::{AssignGroupSeat, CreateGroupTicket, UmrahGroupBooking, UmrahGroupTicket};

use super::{db_error, new_id};

const GROUP_SELECT: &str = "SELECT g.*,
        g.total_tickets - (SELECT COUNT(*) FROM umrah_group_bookings gb WHERE gb.group_ticket_id = g.id)
            AS remaining_tickets
    FROM umrah_group_tickets g";

/// Repository for group blocks and their seat assignments.
#[derive(Debug, Clone)]
pub struct GroupTicketRepository {
    pool: SqlitePool,
}

impl GroupTicketRepository {
    /// Create a new group ticket repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All group blocks by departure date.
    pub async fn list(&self) -> AppResult<Vec<UmrahGroupTicket>> {
        let sql = format!("{GROUP_SELECT} ORDER BY g.departure_date ASC, g.created_at ASC");
        sqlx::query_as::<_, UmrahGroupTicket>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list group tickets"))
    }

    /// Find a group block.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<UmrahGroupTicket>> {
        let sql = format!("{GROUP_SELECT} WHERE g.id = ?");
        sqlx::query_as::<_, UmrahGroupTicket>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find group ticket"))
    }

    /// Insert a group block.
    pub async fn create(&self, data: &CreateGroupTicket, created_by: &str) -> AppResult<UmrahGroupTicket> {
        let id = new_id();
        sqlx::query(
            "INSERT INTO umrah_group_tickets
                (id, group_name, airline_name, departure_date, return_date, total_tickets,
                 buying_price, remarks, created_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&data.group_name)
        .bind(&data.airline_name)
        .bind(&data.departure_date)
        .bind(&data.return_date)
        .bind(data.total_tickets)
        .bind(data.buying_price)
        .bind(&data.remarks)
        .bind(created_by)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to create group ticket"))?;

        let sql = format!("{GROUP_SELECT} WHERE g.id = ?");
        sqlx::query_as::<_, UmrahGroupTicket>(&sql)
            .bind(&id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to load group ticket"))
    }

    /// Passengers assigned to a group block, in assignment order.
    pub async fn bookings_for(&self, group_ticket_id: &str) -> AppResult<Vec<UmrahGroupBooking>> {
        sqlx::query_as::<_, UmrahGroupBooking>(
            "SELECT * FROM umrah_group_bookings WHERE group_ticket_id = ?
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(group_ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list group bookings"))
    }

    /// Oldest group block departing on `departure_date` with a free seat.
    pub async fn first_with_seats(
        &self,
        conn: &mut SqliteConnection,
        departure_date: &str,
    ) -> AppResult<Option<UmrahGroupTicket>> {
        let sql = format!(
            "SELECT * FROM ({GROUP_SELECT} WHERE g.departure_date = ?)
             WHERE remaining_tickets > 0
             ORDER BY created_at ASC, id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, UmrahGroupTicket>(&sql)
            .bind(departure_date)
            .fetch_optional(conn)
            .await
            .map_err(db_error("Failed to find a group with free seats"))
    }

    /// Record a seat assignment.
    pub async fn insert_booking(
        &self,
        conn: &mut SqliteConnection,
        group_ticket_id: &str,
        seat: &AssignGroupSeat,
        created_by: &str,
    ) -> AppResult<UmrahGroupBooking> {
        sqlx::query_as::<_, UmrahGroupBooking>(
            "INSERT INTO umrah_group_bookings
                (id, group_ticket_id, umrah_record_id, passenger_name, passport_number, created_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(new_id())
        .bind(group_ticket_id)
        .bind(&seat.umrah_record_id)
        .bind(&seat.passenger_name)
        .bind(&seat.passport_number)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to assign group seat"))
    }
}
