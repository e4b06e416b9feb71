//! User administration handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use agency_core::error::AppError;
use agency_core::types::pagination::PageResponse;
use agency_core::types::response::ApiResponse;
use agency_entity::user::User;
use agency_service::user::UpdateUserRequest;

use crate::dto::request::{CreateUserBody, StatusRequest};
use crate::extractors::{AuthUser, JsonBody, PaginationParams, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<ApiResponse<PageResponse<User>>, AppError> {
    let users = state
        .user_service
        .list_users(&auth, params.into_page_request())
        .await?;
    Ok(ApiResponse::ok(users))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<User>, AppError> {
    Ok(ApiResponse::ok(state.user_service.get_user(&auth, &id).await?))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateUserBody>,
) -> Result<(StatusCode, ApiResponse<User>), AppError> {
    let user = state.user_service.create_user(&auth, body.into()).await?;
    Ok((StatusCode::CREATED, ApiResponse::with_message(user, "User created")))
}

/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<ApiResponse<User>, AppError> {
    let user = state.user_service.update_user(&auth, &id, req).await?;
    Ok(ApiResponse::with_message(user, "User updated"))
}

/// PATCH /api/users/:id/status
pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<StatusRequest>,
) -> Result<ApiResponse<User>, AppError> {
    let status = req.status.parse()?;
    let user = state.user_service.set_status(&auth, &id, status).await?;
    Ok(ApiResponse::with_message(user, "User status updated"))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    state.user_service.delete_user(&auth, &id).await?;
    Ok(ApiResponse::message("User deleted"))
}
