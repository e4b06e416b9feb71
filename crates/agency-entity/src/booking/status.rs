//! Booking status and payment type enumerations.

use agency_core::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How long a partial-payment booking holds its ticket.
pub const PARTIAL_HOLD_HOURS: i64 = 24;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Waiting for payment or a sales confirmation.
    Pending,
    /// Sale confirmed.
    Confirmed,
    /// Cancelled by staff.
    Cancelled,
    /// Hold window passed without confirmation.
    Expired,
}

impl BookingStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    /// Check if the booking is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Expired)
    }

    /// Check whether `self -> next` is an allowed transition.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, next) {
            (a, b) if *a == b => true,
            (Pending, Confirmed | Cancelled | Expired) => true,
            (Confirmed, Cancelled) => true,
            _ => false,
        }
    }

    /// Enforce the transition table, returning a conflict error otherwise.
    pub fn ensure_transition(&self, next: BookingStatus) -> Result<(), AppError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::conflict(format!(
                "Booking cannot move from '{self}' to '{next}'"
            )))
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            _ => Err(AppError::validation(format!(
                "Invalid booking status: '{s}'. Expected one of: pending, confirmed, cancelled, expired"
            ))),
        }
    }
}

/// Whether the passenger pays in one go or leaves a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    /// Paid in full.
    Full,
    /// Deposit now, balance within the hold window.
    Partial,
}

impl PaymentType {
    /// Return the payment type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn test_transitions() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Expired));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Expired.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Pending));
    }

    #[test]
    fn test_terminal() {
        assert!(Cancelled.is_terminal());
        assert!(Expired.is_terminal());
        assert!(!Confirmed.is_terminal());
    }
}
