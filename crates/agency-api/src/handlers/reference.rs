//! Countries and airlines.

use axum::extract::State;
use axum::http::StatusCode;

use agency_core::error::AppError;
use agency_core::types::response::ApiResponse;
use agency_entity::reference::{Airline, Country};

use crate::dto::request::CreateAirlineRequest;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/countries
pub async fn list_countries(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<ApiResponse<Vec<Country>>, AppError> {
    Ok(ApiResponse::ok(state.reference_service.countries().await?))
}

/// GET /api/airlines
pub async fn list_airlines(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<ApiResponse<Vec<Airline>>, AppError> {
    Ok(ApiResponse::ok(state.reference_service.airlines().await?))
}

/// POST /api/airlines
pub async fn create_airline(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateAirlineRequest>,
) -> Result<(StatusCode, ApiResponse<Airline>), AppError> {
    let airline = state
        .reference_service
        .create_airline(&auth, &req.name, req.code.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(airline, "Airline created"),
    ))
}
