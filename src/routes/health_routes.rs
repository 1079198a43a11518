//! Health check endpoints.

use crate::state::AppState;
use axum::{routing::get, Router};

/// Registers health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Returns a 200 OK status to indicate the service is running.
async fn health_check() -> &'static str {
    "OK"
}
