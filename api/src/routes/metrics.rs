//! Prometheus exposition endpoint.
//!
//! Serves whatever the freshness gauges hold at request time. Requests never
//! wait for a scrape cycle.

use crate::metrics::CONTENT_TYPE;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

/// Creates the exposition routes.
///
/// The gauges are served on `/metrics` and, like most exporters, on `/`.
pub fn metrics_routes(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .route("/", get(render_metrics))
        .with_state(state)
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match state.metrics().render() {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}
