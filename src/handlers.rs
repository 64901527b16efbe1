pub mod budget_handlers;
pub mod expense_handlers;
pub mod user_handlers;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "detail": "user not found." }))]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Build a response with this body and the given status
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// 404 with a fixed resource-specific message
pub(crate) fn not_found(detail: &str) -> Response {
    ErrorResponse::new(detail).into_response_with(StatusCode::NOT_FOUND)
}

/// 422 for a request that parsed but failed validation
pub(crate) fn unprocessable(detail: impl Into<String>) -> Response {
    ErrorResponse::new(detail).into_response_with(StatusCode::UNPROCESSABLE_ENTITY)
}

/// 500 whose details stay in the log
pub(crate) fn internal_error(source: &str) -> Response {
    tracing::error!(error = %source, "request failed on store access");
    ErrorResponse::new("internal server error.")
        .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Flatten validator errors into "field: message; field: message"
pub(crate) fn validation_error_response(validation_errors: ValidationErrors) -> Response {
    let mut fields: Vec<String> = validation_errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    fields.sort();

    unprocessable(fields.join("; "))
}
