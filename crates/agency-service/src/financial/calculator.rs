//! Pure pricing and ratio helpers.

use agency_core::error::AppError;
use agency_entity::MAX_AMOUNT;

/// Smallest accepted markup over the buying price, in percent.
pub const MIN_MARKUP_PERCENT: i64 = 5;

/// Default markup seeding new ticket prices, in percent.
pub const DEFAULT_MARKUP_PERCENT: i64 = 20;

/// Markup used when a country has no sales history, in percent.
pub const FALLBACK_MARKUP_PERCENT: i64 = 30;

/// `numerator / denominator × 100`, rounded to two decimals, or 0 when the
/// denominator is 0.
pub fn percentage(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let ratio = numerator as f64 / denominator as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}

/// `price` raised by `percent`, rounded to the nearest unit.
pub fn with_markup(price: i64, percent: i64) -> i64 {
    (price as f64 * (100 + percent) as f64 / 100.0).round() as i64
}

/// Lowest selling price accepted for a ticket bought at `buying_price`.
pub fn minimum_selling_price(buying_price: i64) -> i64 {
    // Ceiling of buying × 1.05, widened so no price can overflow.
    let minimum = (i128::from(buying_price) * i128::from(100 + MIN_MARKUP_PERCENT) + 99) / 100;
    i64::try_from(minimum).unwrap_or(i64::MAX)
}

/// Whether `selling_price` clears the minimum markup.
pub fn meets_minimum_markup(selling_price: i64, buying_price: i64) -> bool {
    i128::from(selling_price) * 100 >= i128::from(buying_price) * i128::from(100 + MIN_MARKUP_PERCENT)
}

/// Rejects a money amount above [`MAX_AMOUNT`].
pub fn check_amount(label: &str, amount: i64) -> Result<(), AppError> {
    if amount > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{label} cannot exceed {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

/// Suggested selling price: the default markup, raised to the country's
/// historical average when that is higher. Without history the fallback
/// markup applies.
pub fn optimal_selling_price(buying_price: i64, country_average: Option<f64>) -> i64 {
    match country_average {
        Some(average) => {
            with_markup(buying_price, DEFAULT_MARKUP_PERCENT).max(average.round() as i64)
        }
        None => with_markup(buying_price, FALLBACK_MARKUP_PERCENT),
    }
}
