//! Integration tests for loading configuration documents.

use std::fs;
use std::time::Duration;

use rstest::rstest;
use tempfile::TempDir;

use microeditor_config::{Config, ConfigError, LogFormat, UnhandledRequestPolicy};

fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(error) => panic!("failed to create temporary directory: {error}"),
    };
    let path = dir.path().join("microeditor.json");
    if let Err(error) = fs::write(&path, contents) {
        panic!("failed to write configuration: {error}");
    }
    (dir, path)
}

#[rstest]
fn empty_document_yields_defaults() {
    let config = Config::from_json_str("{}").expect("parse");

    assert_eq!(config, Config::default());
    assert_eq!(config.log_filter(), "info");
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[rstest]
fn file_values_override_defaults() {
    let (_dir, path) = write_config(
        r#"{
            "log_filter": "microeditor_bus=debug",
            "log_format": "compact",
            "bus": { "request_timeout_ms": 1500, "unhandled_requests": "drop" }
        }"#,
    );

    let config = Config::from_path(&path).expect("load");

    assert_eq!(config.log_filter(), "microeditor_bus=debug");
    assert_eq!(config.log_format(), LogFormat::Compact);
    assert_eq!(
        config.bus().request_timeout(),
        Some(Duration::from_millis(1500))
    );
    assert_eq!(config.bus().unhandled_requests, UnhandledRequestPolicy::Drop);
    assert_eq!(config.bus().init_poll_max_attempts, 100);
}

#[rstest]
fn missing_file_reports_read_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.json");

    match Config::from_path(&path) {
        Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected read error, got {other:?}"),
    }
}

#[rstest]
#[case::bad_json("{")]
#[case::bad_format(r#"{"log_format": "xml"}"#)]
#[case::bad_policy(r#"{"bus": {"unhandled_requests": "ignore"}}"#)]
fn invalid_documents_report_parse_errors(#[case] contents: &str) {
    let (_dir, path) = write_config(contents);

    let error = Config::from_path(&path).expect_err("should fail");

    assert!(matches!(error, ConfigError::Parse { path: Some(_), .. }));
    assert!(
        error.to_string().contains("microeditor.json"),
        "expected path in message: {error}"
    );
}
