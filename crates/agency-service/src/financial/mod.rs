//! Financial calculator: pricing rules and read-only aggregates.

pub mod calculator;
pub mod service;

pub use calculator::{MIN_MARKUP_PERCENT, check_amount, minimum_selling_price, percentage};
pub use service::{
    BookingCheck, CountryFinancials, DashboardStats, FinancialService, FinancialSummary,
    ValidationResult,
};
