//! One-shot expiry sweep, for deployments that run it from cron with the
//! in-process sweeper disabled.

use agency_api::AppState;
use agency_core::config::AppConfig;
use agency_core::error::AppError;

use crate::output;

/// Execute the sweep command
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let state = AppState::new(config.clone(), db.clone());

    let report = state.sweeper.sweep_once().await?;

    output::print_success("Expiry sweep complete.");
    output::print_kv("Expired bookings", &report.expired_bookings.to_string());
    output::print_kv("Released tickets", &report.released_tickets.to_string());

    db.close().await;
    Ok(())
}
