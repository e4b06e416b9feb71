//! Ticket batch (wholesale purchase) entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Largest number of seats accepted in one purchase.
pub const MAX_BATCH_QUANTITY: i64 = 1000;

/// One wholesale purchase event, expanded into `quantity` tickets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketBatch {
    /// Unique batch identifier.
    pub id: String,
    /// Destination country.
    pub country_code: String,
    pub airline_name: String,
    /// Flight date (`YYYY-MM-DD`).
    pub flight_date: String,
    pub flight_time: Option<String>,
    /// Purchase price per seat.
    pub buying_price: i64,
    /// Number of seats bought.
    pub quantity: i64,
    pub agent_name: String,
    pub agent_contact: Option<String>,
    pub agent_address: Option<String>,
    pub remarks: Option<String>,
    /// User who recorded the purchase.
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketBatch {
    /// Total amount spent on the batch.
    pub fn investment(&self) -> i64 {
        self.buying_price.saturating_mul(self.quantity)
    }
}

/// A batch together with the status breakdown of its tickets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BatchSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub batch: TicketBatch,
    pub country_name: Option<String>,
    pub sold: i64,
    pub available: i64,
    pub locked: i64,
    pub booked: i64,
}

/// Data required to record a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatch {
    pub country_code: String,
    pub airline_name: String,
    pub flight_date: String,
    pub flight_time: Option<String>,
    pub buying_price: i64,
    pub quantity: i64,
    pub agent_name: String,
    pub agent_contact: Option<String>,
    pub agent_address: Option<String>,
    pub remarks: Option<String>,
}

/// Editable batch metadata. Prices and quantities are fixed at intake.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBatch {
    pub agent_name: Option<String>,
    pub agent_contact: Option<String>,
    pub agent_address: Option<String>,
    pub remarks: Option<String>,
}
