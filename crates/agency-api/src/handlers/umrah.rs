//! Umrah records and group ticket handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use agency_core::error::AppError;
use agency_core::types::pagination::PageResponse;
use agency_core::types::response::ApiResponse;
use agency_entity::umrah::{
    AssignGroupSeat, CreateGroupTicket, UmrahGroupBooking, UmrahGroupTicket, UmrahPaymentInput,
    UmrahTransportInput, UmrahWithTransport, UmrahWithoutTransport,
};

use crate::dto::request::PaymentRequest;
use crate::extractors::{AuthUser, JsonBody, PaginationParams, QueryParams, ValidatedJson};
use crate::state::AppState;

// ── With transport ───────────────────────────────────────────

pub async fn list_with_transport(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<ApiResponse<PageResponse<UmrahWithTransport>>, AppError> {
    let records = state
        .umrah_service
        .list_with_transport(&auth, params.into_page_request())
        .await?;
    Ok(ApiResponse::ok(records))
}

pub async fn get_with_transport(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<UmrahWithTransport>, AppError> {
    Ok(ApiResponse::ok(
        state.umrah_service.get_with_transport(&auth, &id).await?,
    ))
}

pub async fn create_with_transport(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(input): JsonBody<UmrahTransportInput>,
) -> Result<(StatusCode, ApiResponse<UmrahWithTransport>), AppError> {
    let record = state.umrah_service.create_with_transport(&auth, input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(record, "Umrah record created"),
    ))
}

pub async fn update_with_transport(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UmrahTransportInput>,
) -> Result<ApiResponse<UmrahWithTransport>, AppError> {
    let record = state
        .umrah_service
        .update_with_transport(&auth, &id, input)
        .await?;
    Ok(ApiResponse::with_message(record, "Umrah record updated"))
}

pub async fn delete_with_transport(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    state.umrah_service.delete_with_transport(&auth, &id).await?;
    Ok(ApiResponse::message("Umrah record deleted"))
}

// ── Without transport ────────────────────────────────────────

pub async fn list_without_transport(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<ApiResponse<PageResponse<UmrahWithoutTransport>>, AppError> {
    let records = state
        .umrah_service
        .list_without_transport(&auth, params.into_page_request())
        .await?;
    Ok(ApiResponse::ok(records))
}

pub async fn get_without_transport(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<UmrahWithoutTransport>, AppError> {
    Ok(ApiResponse::ok(
        state.umrah_service.get_without_transport(&auth, &id).await?,
    ))
}

pub async fn create_without_transport(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(input): JsonBody<UmrahPaymentInput>,
) -> Result<(StatusCode, ApiResponse<UmrahWithoutTransport>), AppError> {
    let record = state
        .umrah_service
        .create_without_transport(&auth, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(record, "Umrah record created"),
    ))
}

pub async fn update_without_transport(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UmrahPaymentInput>,
) -> Result<ApiResponse<UmrahWithoutTransport>, AppError> {
    let record = state
        .umrah_service
        .update_without_transport(&auth, &id, input)
        .await?;
    Ok(ApiResponse::with_message(record, "Umrah record updated"))
}

pub async fn delete_without_transport(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    state
        .umrah_service
        .delete_without_transport(&auth, &id)
        .await?;
    Ok(ApiResponse::message("Umrah record deleted"))
}

/// POST /api/umrah/without-transport/:id/payment
pub async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PaymentRequest>,
) -> Result<ApiResponse<UmrahWithoutTransport>, AppError> {
    let record = state
        .umrah_service
        .record_payment(&auth, &id, req.amount, req.payment_date)
        .await?;
    Ok(ApiResponse::with_message(record, "Payment recorded"))
}

// ── Group tickets ────────────────────────────────────────────

pub async fn list_group_tickets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<Vec<UmrahGroupTicket>>, AppError> {
    Ok(ApiResponse::ok(state.group_service.list(&auth).await?))
}

pub async fn create_group_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CreateGroupTicket>,
) -> Result<(StatusCode, ApiResponse<UmrahGroupTicket>), AppError> {
    let group = state.group_service.create(&auth, req).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(group, "Group ticket created"),
    ))
}

pub async fn group_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<UmrahGroupBooking>>, AppError> {
    Ok(ApiResponse::ok(state.group_service.bookings(&auth, &id).await?))
}

/// POST /api/umrah/group-tickets/auto-assign
pub async fn auto_assign(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<AssignGroupSeat>,
) -> Result<(StatusCode, ApiResponse<UmrahGroupBooking>), AppError> {
    let booking = state.group_service.auto_assign(&auth, req).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(booking, "Passenger assigned to group ticket"),
    ))
}
