//! HTTP handlers for the server.

pub mod devices;
pub mod label;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// `{"error": ...}` with the given status.
pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(json!({ "error": error.into() }))).into_response()
}

/// Handle GET /health.
pub async fn health() -> &'static str {
    "ok"
}
