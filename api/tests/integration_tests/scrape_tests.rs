//! Integration tests for scrape cycles read back through `/metrics`.
//!
//! Tests cover:
//! - Folder, pattern, file and bucket targets end to end
//! - The `-1` sentinel for every kind of absence
//! - Creation time versus modification time
//! - Fatal failures and repeated cycles

use axum::http::StatusCode;
use chrono::{Duration as ChronoDuration, Utc};
use shared::storage::InMemoryObjectStore;
use std::time::Duration;

use super::common::{get_text, series_value, test_exporter, write_aged_file};

const MINUTE: Duration = Duration::from_secs(60);

#[tokio::test]
async fn test_file_modified_five_minutes_ago() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("state.json");
    write_aged_file(&file, 5 * MINUTE);

    let yaml = format!("files:\n  - {}\n", file.display());
    let exporter = test_exporter(&yaml, InMemoryObjectStore::new_shared(), MINUTE);

    exporter.scheduler.scrape_once().await.unwrap();

    let (status, body) = get_text(exporter.app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let labels = format!("file_path=\"{}\"", file.display());
    let value = series_value(&body, "file_last_modified_time_minutes", &labels).unwrap();
    assert!((4.9..5.5).contains(&value), "unexpected value {value}");
}

#[tokio::test]
async fn test_folder_and_file_use_different_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("export.csv");
    write_aged_file(&file, 45 * MINUTE);

    let yaml = format!(
        "folders:\n  - {}\nfiles:\n  - {}\n",
        dir.path().display(),
        file.display()
    );
    let exporter = test_exporter(&yaml, InMemoryObjectStore::new_shared(), MINUTE);
    exporter.scheduler.scrape_once().await.unwrap();

    let (_, body) = get_text(exporter.app, "/metrics").await;

    let folder_labels = format!("folder_path=\"{}\"", dir.path().display());
    let folder_value =
        series_value(&body, "folder_last_file_creation_time_minutes", &folder_labels).unwrap();
    let file_labels = format!("file_path=\"{}\"", file.display());
    let file_value = series_value(&body, "file_last_modified_time_minutes", &file_labels).unwrap();

    // The file was just created but its content is 45 minutes old.
    assert!(folder_value < 1.0, "folder followed mtime: {folder_value}");
    assert!(file_value > 44.0, "file ignored mtime: {file_value}");
}

#[tokio::test]
async fn test_absence_is_published_as_sentinel() {
    let empty = tempfile::tempdir().unwrap();
    let logs = tempfile::tempdir().unwrap();
    std::fs::write(logs.path().join("xabc.log"), b"").unwrap();

    let store = InMemoryObjectStore::new_shared();
    store.create_bucket("empty-bucket").unwrap();
    store.put_object("locked-bucket", Utc::now()).unwrap();
    store.reject_access_key("AKIALOCKED").unwrap();

    let yaml = format!(
        r#"folders:
  - {empty}
regex_folders:
  - path: {logs}
    pattern: abc
  - path: {logs}
    pattern: "(broken"
files:
  - {empty}/never-written.json
s3_buckets:
  - name: empty-bucket
    aws_access_key_id: AKIAOPEN
    aws_secret_access_key: secret
  - name: locked-bucket
    aws_access_key_id: AKIALOCKED
    aws_secret_access_key: secret
"#,
        empty = empty.path().display(),
        logs = logs.path().display(),
    );
    let exporter = test_exporter(&yaml, store, MINUTE);

    let report = exporter.scheduler.scrape_once().await.unwrap();
    assert_eq!(report.measured, 0);
    assert_eq!(report.no_data, 6);

    let (_, body) = get_text(exporter.app, "/metrics").await;
    let empty_path = empty.path().display();
    let logs_path = logs.path().display();

    let expectations = [
        (
            "folder_last_file_creation_time_minutes",
            format!("folder_path=\"{empty_path}\""),
        ),
        (
            "folder_last_matched_file_creation_time_minutes",
            format!("folder_path=\"{logs_path}\",pattern=\"abc\""),
        ),
        (
            "folder_last_matched_file_creation_time_minutes",
            format!("folder_path=\"{logs_path}\",pattern=\"(broken\""),
        ),
        (
            "file_last_modified_time_minutes",
            format!("file_path=\"{empty_path}/never-written.json\""),
        ),
        (
            "s3_last_file_creation_time_minutes",
            "bucket_name=\"empty-bucket\"".to_string(),
        ),
        (
            "s3_last_file_creation_time_minutes",
            "bucket_name=\"locked-bucket\"".to_string(),
        ),
    ];

    for (metric, labels) in &expectations {
        assert_eq!(
            series_value(&body, metric, labels),
            Some(-1.0),
            "{metric}{{{labels}}} missing or not -1 in:\n{body}"
        );
    }
}

#[tokio::test]
async fn test_regex_folder_matches_from_start_of_name() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("abc.log"), b"").unwrap();
    std::fs::write(dir.path().join("xabc.log"), b"").unwrap();

    let yaml = format!(
        "regex_folders:\n  - path: {}\n    pattern: abc\n  - path: {}\n    pattern: bc\n",
        dir.path().display(),
        dir.path().display()
    );
    let exporter = test_exporter(&yaml, InMemoryObjectStore::new_shared(), MINUTE);
    exporter.scheduler.scrape_once().await.unwrap();

    let (_, body) = get_text(exporter.app, "/metrics").await;
    let path = dir.path().display();

    let abc = series_value(
        &body,
        "folder_last_matched_file_creation_time_minutes",
        &format!("folder_path=\"{path}\",pattern=\"abc\""),
    )
    .unwrap();
    let bc = series_value(
        &body,
        "folder_last_matched_file_creation_time_minutes",
        &format!("folder_path=\"{path}\",pattern=\"bc\""),
    )
    .unwrap();

    assert!(abc >= 0.0);
    assert_eq!(bc, -1.0, "pattern matched in the middle of a name");
}

#[tokio::test]
async fn test_bucket_age_from_newest_object() {
    let store = InMemoryObjectStore::new_shared();
    let now = Utc::now();
    store
        .put_object("landing", now - ChronoDuration::minutes(240))
        .unwrap();
    store
        .put_object("landing", now - ChronoDuration::minutes(15))
        .unwrap();

    let yaml = "s3_buckets:\n  - name: landing\n    aws_access_key_id: AKIA\n    aws_secret_access_key: secret\n";
    let exporter = test_exporter(yaml, store, MINUTE);
    exporter.scheduler.scrape_once().await.unwrap();

    let (_, body) = get_text(exporter.app, "/metrics").await;
    let value = series_value(
        &body,
        "s3_last_file_creation_time_minutes",
        "bucket_name=\"landing\"",
    )
    .unwrap();
    assert!((14.9..15.5).contains(&value), "unexpected value {value}");
    assert!(!body.contains("secret"));
}

#[tokio::test]
async fn test_repeated_scrapes_do_not_decrease() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("state.json");
    write_aged_file(&file, 10 * MINUTE);

    let yaml = format!("files:\n  - {}\n", file.display());
    let exporter = test_exporter(&yaml, InMemoryObjectStore::new_shared(), MINUTE);
    let labels = format!("file_path=\"{}\"", file.display());

    exporter.scheduler.scrape_once().await.unwrap();
    let (_, first) = get_text(exporter.app.clone(), "/metrics").await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    exporter.scheduler.scrape_once().await.unwrap();
    let (_, second) = get_text(exporter.app, "/metrics").await;

    let first = series_value(&first, "file_last_modified_time_minutes", &labels).unwrap();
    let second = series_value(&second, "file_last_modified_time_minutes", &labels).unwrap();
    assert!(second >= first, "{second} < {first}");
}

#[tokio::test]
async fn test_new_file_resets_folder_age() {
    let dir = tempfile::tempdir().unwrap();

    let yaml = format!("folders:\n  - {}\n", dir.path().display());
    let exporter = test_exporter(&yaml, InMemoryObjectStore::new_shared(), MINUTE);
    let labels = format!("folder_path=\"{}\"", dir.path().display());

    exporter.scheduler.scrape_once().await.unwrap();
    let (_, before) = get_text(exporter.app.clone(), "/metrics").await;
    assert_eq!(
        series_value(&before, "folder_last_file_creation_time_minutes", &labels),
        Some(-1.0)
    );

    std::fs::write(dir.path().join("landed.csv"), b"x").unwrap();
    exporter.scheduler.scrape_once().await.unwrap();
    let (_, after) = get_text(exporter.app, "/metrics").await;
    let value = series_value(&after, "folder_last_file_creation_time_minutes", &labels).unwrap();
    assert!((0.0..1.0).contains(&value));
}

#[tokio::test]
async fn test_failed_cycle_keeps_earlier_results() {
    let good = tempfile::tempdir().unwrap();
    std::fs::write(good.path().join("a.csv"), b"x").unwrap();

    let store = InMemoryObjectStore::new_shared();
    store.fail_bucket("landing").unwrap();

    let yaml = format!(
        "folders:\n  - {}\ns3_buckets:\n  - name: landing\n    aws_access_key_id: AKIA\n    aws_secret_access_key: secret\n",
        good.path().display()
    );
    let exporter = test_exporter(&yaml, store, MINUTE);

    let err = exporter.scheduler.scrape_once().await.unwrap_err();
    assert!(format!("{err:#}").contains("landing"));

    let (_, body) = get_text(exporter.app, "/metrics").await;
    let labels = format!("folder_path=\"{}\"", good.path().display());
    assert!(series_value(&body, "folder_last_file_creation_time_minutes", &labels).is_some());
    assert!(!body.contains("bucket_name=\"landing\""));
}
