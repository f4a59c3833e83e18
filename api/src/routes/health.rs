//! Health check endpoint.
//!
//! Reports whether the scrape loop has completed a cycle yet, for load
//! balancers and process supervisors.

use crate::scheduler::ScrapeProgress;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `starting` until the first complete scrape cycle, `healthy` afterwards.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Scrape loop progress.
    #[serde(flatten)]
    pub scrape: ScrapeProgress,
}

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check handler.
///
/// Always answers 200 while the listener is up; a failed cycle takes the
/// whole process down rather than degrading this endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let scrape = state.scrape_status().snapshot();
    Json(HealthResponse {
        status: if scrape.completed_cycles == 0 {
            "starting"
        } else {
            "healthy"
        },
        service: "freshwatch-exporter",
        version: env!("CARGO_PKG_VERSION"),
        scrape,
    })
}
