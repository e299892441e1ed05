//! Text label handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::error::LabelError;
use crate::protocol::raster::Raster;
use crate::render::{LabelRequest, RenderedLabel, render_label};

use super::super::state::AppState;
use super::error_response;

const MISSING_TEXT: &str = "Missing 'text' in request body";

/// Accept the body only if it is JSON with a non-blank `text`.
fn validate(body: Result<Json<LabelRequest>, JsonRejection>) -> Result<LabelRequest, Response> {
    match body {
        Ok(Json(request)) if !request.text.trim().is_empty() => Ok(request),
        Ok(_) => Err(error_response(StatusCode::BAD_REQUEST, MISSING_TEXT)),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected label request");
            Err(error_response(StatusCode::BAD_REQUEST, MISSING_TEXT))
        }
    }
}

fn render(state: &AppState, request: &LabelRequest) -> RenderedLabel {
    let layout = &state.setup.layout;
    render_label(request, layout, &state.fonts, &layout.stamp_now())
}

/// Handle POST /print - render the text and send it to the printer.
pub async fn print(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LabelRequest>, JsonRejection>,
) -> Response {
    let request = match validate(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let text = request.formatted_text();
    info!(text = %text, "creating label");

    // Check the printer before rendering anything
    let printer = state.printer.clone();
    let status = match tokio::task::spawn_blocking(move || printer.status()).await {
        Ok(status) => status,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Task error: {}", e),
            );
        }
    };
    if !status.connected {
        warn!(details = %status.message, "printer not connected");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "Printer not connected",
                "details": status.message,
            })),
        )
            .into_response();
    }

    // Render, rasterize and send (blocking, run in separate thread)
    let job_state = state.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<(), LabelError> {
        let label = render(&job_state, &request);
        let setup = &job_state.setup;
        let raster = Raster::from_gray(&label.image, setup.label, setup.model, &setup.options)?;
        job_state.printer.print(&raster)
    })
    .await;

    match result {
        Ok(Ok(())) => {
            info!(text = %text, "label printed");
            (
                StatusCode::OK,
                Json(json!({ "status": "printed", "text": text })),
            )
                .into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, "printer error");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Printer error: {}", e),
            )
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Task error: {}", e),
        ),
    }
}

/// Handle POST /preview - render the label as PNG without printing.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LabelRequest>, JsonRejection>,
) -> Response {
    let request = match validate(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let result = tokio::task::spawn_blocking(move || render(&state, &request).to_png()).await;

    match result {
        Ok(Ok(png)) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Ok(Err(e)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render preview: {}", e),
        ),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Task error: {}", e),
        ),
    }
}
