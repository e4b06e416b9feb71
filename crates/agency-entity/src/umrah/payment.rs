//! Umrah packages without transport, paid in instalments.

use agency_core::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::MAX_AMOUNT;

/// A pilgrim record tracked by amount owed.
///
/// `remaining_amount == total_amount - amount_paid` after every write.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UmrahWithoutTransport {
    pub id: String,
    pub passenger_name: String,
    pub pnr: Option<String>,
    pub passport_number: Option<String>,
    pub mobile: Option<String>,
    pub agent_name: Option<String>,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub total_amount: i64,
    pub amount_paid: i64,
    pub remaining_amount: i64,
    /// Date of the most recent instalment (`YYYY-MM-DD`).
    pub last_payment_date: Option<String>,
    pub remarks: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UmrahWithoutTransport {
    /// Amount still owed for the given totals.
    pub fn remaining(total_amount: i64, amount_paid: i64) -> i64 {
        total_amount - amount_paid
    }

    /// Apply an instalment, returning the new `(amount_paid, remaining)`.
    pub fn apply_payment(&self, amount: i64) -> Result<(i64, i64), AppError> {
        if amount <= 0 {
            return Err(AppError::validation("Payment amount must be positive"));
        }
        if amount > self.remaining_amount {
            return Err(AppError::validation(format!(
                "Payment of {amount} exceeds the remaining amount of {}",
                self.remaining_amount
            )));
        }
        let paid = self.amount_paid + amount;
        Ok((paid, Self::remaining(self.total_amount, paid)))
    }
}

/// Writable fields of a payment-tracked package. Updates replace every
/// field and recompute the remaining amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UmrahPaymentInput {
    pub passenger_name: String,
    pub pnr: Option<String>,
    pub passport_number: Option<String>,
    pub mobile: Option<String>,
    pub agent_name: Option<String>,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub total_amount: i64,
    pub amount_paid: i64,
    pub remarks: Option<String>,
}

impl UmrahPaymentInput {
    /// Check the amounts are consistent.
    pub fn check_amounts(&self) -> Result<(), AppError> {
        if self.total_amount < 0 || self.amount_paid < 0 {
            return Err(AppError::validation("Amounts cannot be negative"));
        }
        if self.total_amount > MAX_AMOUNT {
            return Err(AppError::validation(format!(
                "Total amount cannot exceed {MAX_AMOUNT}"
            )));
        }
        if self.amount_paid > self.total_amount {
            return Err(AppError::validation(
                "Amount paid cannot exceed the total amount",
            ));
        }
        Ok(())
    }
}
