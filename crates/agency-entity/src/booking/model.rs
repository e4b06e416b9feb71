//! Booking entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::{BookingStatus, PaymentType};

/// A sale (or a hold) of one ticket to one passenger.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: String,
    /// The ticket this booking is for.
    pub ticket_id: String,
    /// Selling agent.
    pub agent_name: String,
    pub agent_email: Option<String>,
    pub agent_phone: Option<String>,
    /// Passenger details.
    pub passenger_name: String,
    pub passenger_passport: Option<String>,
    pub passenger_phone: Option<String>,
    pub passenger_email: Option<String>,
    /// Number of travellers on the booking.
    pub pax_count: i64,
    /// Agreed selling price.
    pub selling_price: i64,
    /// Full or partial payment.
    pub payment_type: PaymentType,
    /// Deposit taken for a partial payment.
    pub partial_amount: Option<i64>,
    /// Free-text payment method.
    pub payment_method: String,
    pub comments: Option<String>,
    /// Stored status. See [`Booking::effective_status`].
    pub status: BookingStatus,
    /// User who created the booking.
    pub created_by: Option<String>,
    /// Set once, on the first confirmation.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// End of the partial-payment hold.
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Status as observed at `now`: a pending booking past its hold
    /// window reads as expired even before the sweeper has run.
    pub fn effective_status(&self, now: DateTime<Utc>) -> BookingStatus {
        match (self.status, self.expires_at) {
            (BookingStatus::Pending, Some(expires_at)) if expires_at <= now => {
                BookingStatus::Expired
            }
            (status, _) => status,
        }
    }

    /// Whether this booking still keeps its ticket out of sale.
    pub fn holds_ticket(&self) -> bool {
        matches!(self.status, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// A booking as returned to clients, carrying its status at read time.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub effective_status: BookingStatus,
}

impl BookingView {
    /// Wrap a booking observed at `now`.
    pub fn at(booking: Booking, now: DateTime<Utc>) -> Self {
        let effective_status = booking.effective_status(now);
        Self {
            booking,
            effective_status,
        }
    }
}

/// Row data for a new booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub ticket_id: String,
    pub agent_name: String,
    pub agent_email: Option<String>,
    pub agent_phone: Option<String>,
    pub passenger_name: String,
    pub passenger_passport: Option<String>,
    pub passenger_phone: Option<String>,
    pub passenger_email: Option<String>,
    pub pax_count: i64,
    pub selling_price: i64,
    pub payment_type: PaymentType,
    pub partial_amount: Option<i64>,
    pub payment_method: String,
    pub comments: Option<String>,
    pub status: BookingStatus,
    pub created_by: String,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Optional filters of the booking listing.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Stored status.
    pub status: Option<BookingStatus>,
    /// Restrict to bookings created by this user.
    pub created_by: Option<String>,
}
