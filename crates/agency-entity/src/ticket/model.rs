//! Ticket entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::TicketStatus;

/// One physical seat from a ticket batch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: String,
    /// Batch this seat was bought in.
    pub batch_id: String,
    /// Generated flight number (`<airline code><sequence>`).
    pub flight_number: String,
    /// Inventory status.
    pub status: TicketStatus,
    /// Default selling price fixed at intake.
    pub selling_price: i64,
    /// Aircraft type, when known.
    pub aircraft: Option<String>,
    /// Seat class (`economy` unless set).
    pub seat_class: String,
    /// End of the current lock window. Only set while `status = locked`.
    pub locked_until: Option<DateTime<Utc>>,
    /// User who sold the ticket.
    pub sold_by: Option<String>,
    /// When the ticket was sold.
    pub sold_at: Option<DateTime<Utc>>,
    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
    /// When the ticket was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A ticket joined with its batch and country, as listed to clients.
///
/// `buying_price` is cleared for callers without the `view_buying_price`
/// capability and is then omitted from the JSON.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketView {
    pub id: String,
    pub batch_id: String,
    pub flight_number: String,
    pub status: TicketStatus,
    pub selling_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buying_price: Option<i64>,
    pub aircraft: Option<String>,
    pub seat_class: String,
    pub locked_until: Option<DateTime<Utc>>,
    pub sold_by: Option<String>,
    pub sold_at: Option<DateTime<Utc>>,
    pub country_code: String,
    pub country_name: Option<String>,
    pub country_flag: Option<String>,
    pub airline_name: String,
    pub flight_date: String,
    pub flight_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketView {
    /// Drop the purchase price from the view.
    pub fn without_buying_price(mut self) -> Self {
        self.buying_price = None;
        self
    }
}

/// Row data for a ticket created during batch intake.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub batch_id: String,
    pub flight_number: String,
    pub selling_price: i64,
    pub aircraft: Option<String>,
    pub seat_class: String,
}

/// Optional filters of the ticket listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketFilter {
    /// Country code of the batch.
    pub country: Option<String>,
    /// Ticket status.
    pub status: Option<TicketStatus>,
    /// Airline name (exact match, case-insensitive).
    pub airline: Option<String>,
}
