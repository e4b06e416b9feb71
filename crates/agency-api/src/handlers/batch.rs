//! Ticket batch handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use agency_core::error::AppError;
use agency_core::types::pagination::PageResponse;
use agency_core::types::response::ApiResponse;
use agency_entity::batch::{BatchSummary, TicketBatch};
use agency_service::inventory::{BatchCreated, BatchDetail};

use crate::dto::request::{CreateBatchRequest, UpdateBatchRequest};
use crate::extractors::{AuthUser, PaginationParams, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/ticket-batches
pub async fn list_batches(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<ApiResponse<PageResponse<BatchSummary>>, AppError> {
    let batches = state
        .batch_service
        .list_batches(&auth, params.into_page_request())
        .await?;
    Ok(ApiResponse::ok(batches))
}

/// POST /api/ticket-batches
pub async fn create_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateBatchRequest>,
) -> Result<(StatusCode, ApiResponse<BatchCreated>), AppError> {
    let created = state.batch_service.create_batch(&auth, req.into()).await?;
    let message = format!("Created batch with {} tickets", created.tickets_created);
    Ok((StatusCode::CREATED, ApiResponse::with_message(created, message)))
}

/// GET /api/ticket-batches/:id
pub async fn get_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<BatchDetail>, AppError> {
    Ok(ApiResponse::ok(state.batch_service.get_batch(&auth, &id).await?))
}

/// PUT /api/ticket-batches/:id
pub async fn update_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateBatchRequest>,
) -> Result<ApiResponse<TicketBatch>, AppError> {
    let batch = state
        .batch_service
        .update_batch(&auth, &id, req.into())
        .await?;
    Ok(ApiResponse::with_message(batch, "Ticket batch updated"))
}

/// DELETE /api/ticket-batches/:id
pub async fn delete_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    state.batch_service.delete_batch(&auth, &id).await?;
    Ok(ApiResponse::message("Ticket batch deleted"))
}
