//! The JSON envelope shared by every API response.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// A single field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Request field name.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Standard response envelope: `{success, message, data?, errors?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Response payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Field-level validation problems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Diagnostic detail, only present outside production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful response with a payload.
    pub fn ok(data: T) -> Self {
        Self::with_message(data, "OK")
    }

    /// Creates a successful response with a payload and a custom message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
            stack: None,
        }
    }
}

impl ApiResponse<()> {
    /// Creates a successful response without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
            stack: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
