//! Group Umrah seat inventory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A block of seats bought for a group departure.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UmrahGroupTicket {
    pub id: String,
    pub group_name: String,
    pub airline_name: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub total_tickets: i64,
    /// `total_tickets` minus the assigned seats, computed by the query.
    pub remaining_tickets: i64,
    pub buying_price: i64,
    pub remarks: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UmrahGroupTicket {
    /// Whether a passenger can still be assigned.
    pub fn has_seats(&self) -> bool {
        self.remaining_tickets > 0
    }
}

/// Data required to record a group block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupTicket {
    pub group_name: String,
    pub airline_name: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub total_tickets: i64,
    pub buying_price: i64,
    pub remarks: Option<String>,
}

/// A passenger assigned to a seat of a group block.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UmrahGroupBooking {
    pub id: String,
    pub group_ticket_id: String,
    /// Linked transport package, when the passenger has one.
    pub umrah_record_id: Option<String>,
    pub passenger_name: String,
    pub passport_number: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request to place a passenger on the first group with free seats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignGroupSeat {
    pub departure_date: String,
    pub passenger_name: String,
    pub passport_number: Option<String>,
    pub umrah_record_id: Option<String>,
}
