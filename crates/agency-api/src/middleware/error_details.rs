//! Adds the `stack` diagnostic to error envelopes when
//! `server.expose_error_details` is on.

use axum::Json;
use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use agency_core::error::ErrorDiagnostics;

use crate::state::AppState;

/// Largest error body that is rewritten.
const MAX_ERROR_BODY: usize = 64 * 1024;

pub async fn expose_error_details(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if !state.config.server.expose_error_details {
        return response;
    }
    let Some(ErrorDiagnostics(diagnostic)) = response.extensions().get::<ErrorDiagnostics>().cloned()
    else {
        return response;
    };

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read error body");
            return (parts.status, Json(serde_json::json!({
                "success": false,
                "message": "Internal server error",
                "stack": diagnostic,
            })))
                .into_response();
        }
    };

    let mut envelope: Value = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        serde_json::json!({ "success": false, "message": String::from_utf8_lossy(&bytes) })
    });
    if let Some(object) = envelope.as_object_mut() {
        object.insert("stack".to_string(), Value::String(diagnostic));
    }

    (parts.status, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use tower::ServiceExt;

    use agency_core::config::AppConfig;
    use agency_core::error::AppError;
    use agency_database::DatabasePool;

    use super::*;

    async fn failing() -> Result<(), AppError> {
        Err(AppError::conflict("Ticket is already sold"))
    }

    async fn body_of(app: Router) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), MAX_ERROR_BODY).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn app(expose: bool) -> Router {
        let mut config = AppConfig::default();
        config.server.expose_error_details = expose;
        let state = AppState::new(config, DatabasePool::in_memory().await.unwrap());
        Router::new()
            .route("/", get(failing))
            .layer(from_fn_with_state(state.clone(), expose_error_details))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_stack_only_when_enabled() {
        let (status, body) = body_of(app(false).await).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert!(body.get("stack").is_none());

        let (status, body) = body_of(app(true).await).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Ticket is already sold");
        assert!(body["stack"].as_str().unwrap().contains("CONFLICT"));
    }
}
