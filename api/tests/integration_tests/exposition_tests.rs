//! Integration tests for the exposition endpoint while the scheduler runs.
//!
//! Tests cover:
//! - Serving between scrape cycles without waiting for the next one
//! - Concurrent reads and writes of the same series
//! - Exposition format details

use axum::http::StatusCode;
use shared::models::{FileTarget, ProbeOutcome, Target};
use shared::storage::InMemoryObjectStore;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::common::{get_text, series_value, test_app, test_exporter, write_aged_file};

#[tokio::test]
async fn test_metrics_readable_between_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("state.json");
    write_aged_file(&file, Duration::from_secs(5 * 60));

    let yaml = format!("files:\n  - {}\n", file.display());
    // The second cycle is an hour away: every request below falls between cycles.
    let exporter = test_exporter(
        &yaml,
        InMemoryObjectStore::new_shared(),
        Duration::from_secs(3600),
    );
    let labels = format!("file_path=\"{}\"", file.display());

    let shutdown = CancellationToken::new();
    let task = tokio::spawn(exporter.scheduler.clone().run(shutdown.clone()));

    let first = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let (_, body) = get_text(exporter.app.clone(), "/metrics").await;
            if let Some(value) = series_value(&body, "file_last_modified_time_minutes", &labels) {
                break value;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("first cycle never published");
    assert!((4.9..5.5).contains(&first), "unexpected value {first}");

    for _ in 0..5 {
        let (status, body) = tokio::time::timeout(
            Duration::from_secs(1),
            get_text(exporter.app.clone(), "/metrics"),
        )
        .await
        .expect("metrics request blocked");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            series_value(&body, "file_last_modified_time_minutes", &labels),
            Some(first)
        );
    }

    shutdown.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_writes_never_tear_reads() {
    let (app, metrics) = test_app();
    let target = Target::File(FileTarget {
        path: "/var/lib/pipeline/state.json".to_string(),
    });
    metrics.record(&target, &ProbeOutcome::measured(1.0));

    let writer_metrics = metrics.clone();
    let writer_target = target.clone();
    let writer = tokio::spawn(async move {
        for i in 0..2_000 {
            let value = if i % 2 == 0 { 1.0 } else { 123_456.75 };
            writer_metrics.record(&writer_target, &ProbeOutcome::measured(value));
            tokio::task::yield_now().await;
        }
    });

    for _ in 0..50 {
        let (_, body) = get_text(app.clone(), "/metrics").await;
        let value = series_value(
            &body,
            "file_last_modified_time_minutes",
            "file_path=\"/var/lib/pipeline/state.json\"",
        )
        .unwrap();
        assert!(value == 1.0 || value == 123_456.75, "torn value {value}");
    }

    writer.await.unwrap();
}

#[tokio::test]
async fn test_exposition_declares_gauge_families() {
    let (app, metrics) = test_app();
    metrics.record(
        &Target::File(FileTarget {
            path: "/tmp/a".to_string(),
        }),
        &ProbeOutcome::measured(0.5),
    );

    let (status, body) = get_text(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("# HELP file_last_modified_time_minutes Time since file was last modified"));
    assert!(body.contains("# TYPE file_last_modified_time_minutes gauge"));
    assert_eq!(
        series_value(&body, "file_last_modified_time_minutes", "file_path=\"/tmp/a\""),
        Some(0.5)
    );
}
