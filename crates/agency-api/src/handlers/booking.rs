//! Booking handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use agency_core::error::AppError;
use agency_core::types::pagination::PageRequest;
use agency_core::types::response::ApiResponse;
use agency_entity::booking::{BookingStatus, BookingView};

use crate::dto::request::{BookingQuery, CreateBookingBody, StatusRequest};
use crate::dto::response::BookingList;
use crate::extractors::{AuthUser, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<BookingQuery>,
) -> Result<ApiResponse<BookingList>, AppError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<BookingStatus>)
        .transpose()?;
    let page = PageRequest::new(query.limit, query.offset);

    let bookings = state
        .booking_service
        .list_bookings(&auth, status, page)
        .await?;
    Ok(ApiResponse::ok(bookings.into()))
}

/// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<BookingView>, AppError> {
    Ok(ApiResponse::ok(state.booking_service.get_booking(&auth, &id).await?))
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateBookingBody>,
) -> Result<(StatusCode, ApiResponse<BookingView>), AppError> {
    let booking = state
        .booking_service
        .create_booking(&auth, body.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(booking, "Booking created"),
    ))
}

/// PATCH /api/bookings/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<StatusRequest>,
) -> Result<ApiResponse<BookingView>, AppError> {
    let booking = state
        .booking_service
        .update_status(&auth, &id, &req.status)
        .await?;
    Ok(ApiResponse::with_message(booking, "Booking status updated"))
}

/// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    state.booking_service.delete_booking(&auth, &id).await?;
    Ok(ApiResponse::message("Booking deleted"))
}
