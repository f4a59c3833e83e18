//! Integration tests for the health check endpoint.

use axum::http::StatusCode;
use shared::storage::InMemoryObjectStore;
use std::time::Duration;

use super::common::{get, test_app, test_exporter};

#[tokio::test]
async fn test_health_check() {
    let (app, _metrics) = test_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "starting");
    assert_eq!(response["service"], "freshwatch-exporter");
}

#[tokio::test]
async fn test_health_reports_completed_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = format!("folders:\n  - {}\n", dir.path().display());
    let exporter = test_exporter(
        &yaml,
        InMemoryObjectStore::new_shared(),
        Duration::from_secs(60),
    );

    let (_, before) = get(exporter.app.clone(), "/health").await;
    assert_eq!(before["completed_cycles"], 0);

    exporter.scheduler.scrape_once().await.unwrap();

    let (status, after) = get(exporter.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["status"], "healthy");
    assert_eq!(after["completed_cycles"], 1);
    assert!(after["last_completed"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _metrics) = test_app();

    let (status, _) = get(app, "/api/v1/logs").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
