//! Metrics exposition endpoint.

use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;
use axum::{
    extract::State, http::header::CONTENT_TYPE, http::StatusCode, response::IntoResponse,
    routing::get, Router,
};

/// Creates the metrics route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Handler for the /metrics endpoint.
///
/// Returns all collected metrics in Prometheus text format.
async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, HTTPError> {
    let metrics_text = state.metrics.render().map_err(|e| {
        tracing::error!("Failed to render metrics: {}", e);
        HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render metrics")
    })?;

    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, state.metrics.content_type())],
        metrics_text,
    ))
}
