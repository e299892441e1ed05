//! Printer discovery handler.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::dispatch::ConnectionStatus;
use crate::transport::AVAILABLE_BACKENDS;

use super::super::state::AppState;
use super::error_response;

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<String>,
    pub available_backends: &'static [&'static str],
    pub connection_status: ConnectionStatus,
}

/// Handle GET /devices - list printers and check the configured one.
pub async fn list(State(state): State<Arc<AppState>>) -> Response {
    let printer = state.printer.clone();
    let result =
        tokio::task::spawn_blocking(move || (printer.devices(), printer.status())).await;

    match result {
        Ok((devices, connection_status)) => Json(DevicesResponse {
            devices,
            available_backends: AVAILABLE_BACKENDS,
            connection_status,
        })
        .into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Task error: {}", e),
        ),
    }
}
