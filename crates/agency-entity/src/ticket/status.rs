//! Ticket status state machine.

use agency_core::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How long a lock holds a ticket before it may be released.
pub const LOCK_WINDOW_HOURS: i64 = 24;

/// Inventory status of a single seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// On sale.
    Available,
    /// Held for a full-payment booking awaiting sales confirmation.
    Booked,
    /// Held for 24 hours by a partial-payment booking.
    Locked,
    /// Sold to a passenger.
    Sold,
}

impl TicketStatus {
    /// Every status, in display order.
    pub const ALL: [TicketStatus; 4] = [Self::Available, Self::Booked, Self::Locked, Self::Sold];

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Locked => "locked",
            Self::Sold => "sold",
        }
    }

    /// A ticket that is booked or locked is held by a pending booking.
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Booked | Self::Locked)
    }

    /// Check whether `self -> next` is an allowed transition.
    ///
    /// Same-status moves are allowed (no-op, or a lock refresh).
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        match (self, next) {
            (a, b) if *a == b => true,
            (Available, Booked | Locked | Sold) => true,
            (Booked, Available | Locked | Sold) => true,
            (Locked, Available | Sold) => true,
            (Sold, Available) => true,
            _ => false,
        }
    }

    /// Enforce the transition table, returning a conflict error otherwise.
    pub fn ensure_transition(&self, next: TicketStatus) -> Result<(), AppError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::conflict(format!(
                "Ticket cannot move from '{self}' to '{next}'"
            )))
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "booked" => Ok(Self::Booked),
            "locked" => Ok(Self::Locked),
            "sold" => Ok(Self::Sold),
            _ => Err(AppError::validation(format!(
                "Invalid ticket status: '{s}'. Expected one of: available, booked, locked, sold"
            ))),
        }
    }
}
