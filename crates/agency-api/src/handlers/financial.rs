//! Financial calculator endpoints.

use axum::extract::State;

use agency_core::error::AppError;
use agency_core::types::response::ApiResponse;
use agency_database::repositories::financial::DailySales;
use agency_service::financial::{
    CountryFinancials, FinancialSummary, ValidationResult, minimum_selling_price,
};

use crate::dto::request::{OptimalPriceQuery, ValidateBookingRequest};
use crate::dto::response::OptimalPriceResponse;
use crate::extractors::{AuthUser, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/financial/summary
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<FinancialSummary>, AppError> {
    Ok(ApiResponse::ok(state.financial_service.summary(&auth).await?))
}

/// GET /api/financial/countries
pub async fn countries(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<Vec<CountryFinancials>>, AppError> {
    Ok(ApiResponse::ok(state.financial_service.countries(&auth).await?))
}

/// GET /api/financial/today
pub async fn today(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<DailySales>, AppError> {
    Ok(ApiResponse::ok(state.financial_service.today(&auth).await?))
}

/// GET /api/financial/optimal-price
pub async fn optimal_price(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<OptimalPriceQuery>,
) -> Result<ApiResponse<OptimalPriceResponse>, AppError> {
    let optimal_price = state
        .financial_service
        .optimal_price(&auth, query.buying_price, &query.country_code)
        .await?;
    Ok(ApiResponse::ok(OptimalPriceResponse {
        buying_price: query.buying_price,
        minimum_price: minimum_selling_price(query.buying_price),
        country_code: query.country_code,
        optimal_price,
    }))
}

/// POST /api/financial/validate-booking
pub async fn validate_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ValidateBookingRequest>,
) -> Result<ApiResponse<ValidationResult>, AppError> {
    let result = state
        .financial_service
        .validate_booking(&auth, &req.ticket_id, req.selling_price)
        .await?;
    Ok(ApiResponse::ok(result))
}
