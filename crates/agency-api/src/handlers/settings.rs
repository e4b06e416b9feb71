//! Settings, export and activity log handlers.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use agency_core::error::AppError;
use agency_core::types::response::ApiResponse;
use agency_entity::activity::ActivityLog;
use agency_service::settings::ExportFormat;

use crate::dto::request::{ActivityQuery, ExportQuery, UpdateSettingsRequest};
use crate::extractors::{AuthUser, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<ApiResponse<BTreeMap<String, String>>, AppError> {
    Ok(ApiResponse::ok(state.settings_service.get_all().await?))
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateSettingsRequest>,
) -> Result<ApiResponse<BTreeMap<String, String>>, AppError> {
    let settings = state.settings_service.update(&auth, req.settings).await?;
    Ok(ApiResponse::with_message(settings, "Settings updated"))
}

/// GET /api/settings/export/data
///
/// Returns the export as a file download rather than an envelope.
pub async fn export_data(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ExportQuery>,
) -> Result<Response, AppError> {
    let format = match query.format.as_deref() {
        Some(f) if !f.is_empty() => f.parse::<ExportFormat>()?,
        _ => ExportFormat::default(),
    };
    let file = state.settings_service.export(&auth, format).await?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.body,
    )
        .into_response())
}

/// GET /api/settings/logs/activity
pub async fn activity_log(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ActivityQuery>,
) -> Result<ApiResponse<Vec<ActivityLog>>, AppError> {
    let entries = state
        .settings_service
        .activity(&auth, query.limit, query.user_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(entries))
}
