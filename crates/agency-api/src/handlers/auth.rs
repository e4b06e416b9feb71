//! Auth handlers: login and current user.

use axum::extract::State;

use agency_core::error::AppError;
use agency_core::types::response::ApiResponse;
use agency_entity::user::User;
use agency_service::auth::LoginResult;

use crate::dto::request::LoginRequest;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResult>, AppError> {
    let result = state.auth_service.login(&req.username, &req.password).await?;
    Ok(ApiResponse::with_message(result, "Login successful"))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<User>, AppError> {
    let user = state.auth_service.current_user(&auth).await?;
    Ok(ApiResponse::ok(user))
}
