//! Health check handler.

use axum::extract::State;

use agency_core::types::response::ApiResponse;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let database = match state.db.health_check().await {
        Ok(true) => "connected",
        Ok(false) => "unavailable",
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            "unavailable"
        }
    };

    ApiResponse::ok(HealthResponse {
        status: if database == "connected" { "ok" } else { "degraded" },
        database,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
