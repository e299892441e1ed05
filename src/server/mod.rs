//! # HTTP Server for Label Printing
//!
//! Accepts text over HTTP and prints it as an auto-fitted label.
//!
//! ## Usage
//!
//! ```bash
//! qlabel serve --listen 0.0.0.0:5000
//! curl -X POST localhost:5000/print -H 'Content-Type: application/json' \
//!      -d '{"text": "apple juice"}'
//! ```
//!
//! ## Routes
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /print` | render and print `{"text": ...}` |
//! | `POST /preview` | same body, returns the label as PNG |
//! | `GET /devices` | connected printers and backend status |
//! | `GET /health` | liveness probe |

mod handlers;
mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::LabelError;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/print", post(handlers::label::print))
        .route("/preview", post(handlers::label::preview))
        .route("/devices", get(handlers::devices::list))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use qlabel::config::Settings;
/// use qlabel::server::{AppState, serve};
///
/// # async fn example() -> Result<(), qlabel::error::LabelError> {
/// let settings = Settings::default();
/// let state = AppState::new(
///     settings.resolve()?,
///     settings.font_book(),
///     Arc::new(settings.device_printer()),
/// );
///
/// serve(Arc::new(state), "0.0.0.0:5000").await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(state: Arc<AppState>, listen_addr: &str) -> Result<(), LabelError> {
    let setup = &state.setup;
    info!(
        model = setup.model.name,
        label = setup.label.name,
        width = setup.layout.width,
        height = setup.layout.height,
        font = %state.fonts.text().name(),
        "label printer server starting"
    );

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .map_err(|e| LabelError::Transport(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    info!("listening on http://{}", listen_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| LabelError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}
