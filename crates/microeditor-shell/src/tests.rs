//! Tests for the shell entry point.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use microeditor_config::{Config, ConfigError};
use mockall::mock;
use rstest::rstest;
use serde_json::Value;
use tempfile::NamedTempFile;

use super::*;

mock! {
    Loader {}

    impl ConfigLoader for Loader {
        fn load(&self, cli: &Cli) -> Result<Config, ConfigError>;
    }
}

mock! {
    Reporter {}

    impl SessionReporter for Reporter {
        fn session_starting(&self, document: &Path);
        fn session_configured(&self, config: &Config);
        fn editor_initialised(&self, attempts: u32);
        fn session_completed(&self, summary: &SessionSummary);
        fn session_failed(&self, error: &ShellError);
    }
}

fn args(values: &[&str]) -> Vec<OsString> {
    values.iter().map(OsString::from).collect()
}

fn document(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write document");
    file
}

fn quiet_reporter() -> MockReporter {
    let mut reporter = MockReporter::new();
    reporter.expect_session_starting().return_const(());
    reporter.expect_session_configured().return_const(());
    reporter.expect_editor_initialised().return_const(());
    reporter
}

#[rstest]
fn help_is_written_to_stdout() {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run_with(
        args(&["microeditor-shell", "--help"]),
        &mut stdout,
        &mut stderr,
        &MockLoader::new(),
        &MockReporter::new(),
    );

    assert_eq!(code, ExitCode::SUCCESS);
    assert!(String::from_utf8_lossy(&stdout).contains("Usage"));
    assert!(stderr.is_empty());
}

#[rstest]
fn missing_document_argument_is_a_usage_error() {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run_with(
        args(&["microeditor-shell"]),
        &mut stdout,
        &mut stderr,
        &MockLoader::new(),
        &MockReporter::new(),
    );

    assert_eq!(code, ExitCode::from(2));
    assert!(stdout.is_empty());
    assert!(String::from_utf8_lossy(&stderr).contains("<DOCUMENT>"));
}

#[rstest]
fn configuration_failures_are_reported() {
    let mut loader = MockLoader::new();
    loader.expect_load().times(1).returning(|_| {
        Err(ConfigError::Read {
            path: PathBuf::from("missing.json"),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    });
    let mut reporter = MockReporter::new();
    reporter.expect_session_starting().times(1).return_const(());
    reporter
        .expect_session_failed()
        .withf(|error| matches!(error, ShellError::Configuration { .. }))
        .times(1)
        .return_const(());

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run_with(
        args(&["microeditor-shell", "doc.bpmn"]),
        &mut stdout,
        &mut stderr,
        &loader,
        &reporter,
    );

    assert_eq!(code, ExitCode::FAILURE);
    assert!(stdout.is_empty());
    assert!(String::from_utf8_lossy(&stderr).contains("failed to load configuration"));
}

#[rstest]
fn successful_runs_print_the_summary() {
    let file = document("<definitions/>");
    let path = file.path().to_string_lossy().into_owned();
    let mut loader = MockLoader::new();
    loader
        .expect_load()
        .times(1)
        .returning(|_| Ok(Config::default()));
    let mut reporter = quiet_reporter();
    reporter
        .expect_session_completed()
        .withf(|summary| summary.ready && summary.init_attempts == 1)
        .times(1)
        .return_const(());
    reporter.expect_session_failed().never();

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run_with(
        args(&["microeditor-shell", path.as_str(), "--language", "BPMN"]),
        &mut stdout,
        &mut stderr,
        &loader,
        &reporter,
    );

    assert_eq!(code, ExitCode::SUCCESS, "{}", String::from_utf8_lossy(&stderr));
    let summary: Value = serde_json::from_slice(&stdout).expect("summary is JSON");
    assert_eq!(summary["language"], "BPMN");
    assert_eq!(summary["edits"], serde_json::json!(["edit-1"]));
    assert_eq!(summary["ready"], true);
}

#[rstest]
fn unreadable_documents_fail_the_run() {
    let mut loader = MockLoader::new();
    loader.expect_load().returning(|_| Ok(Config::default()));
    let mut reporter = quiet_reporter();
    reporter
        .expect_session_failed()
        .withf(|error| matches!(error, ShellError::Document { .. }))
        .times(1)
        .return_const(());

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run_with(
        args(&["microeditor-shell", "/nonexistent/diagram.bpmn"]),
        &mut stdout,
        &mut stderr,
        &loader,
        &reporter,
    );

    assert_eq!(code, ExitCode::FAILURE);
    assert!(String::from_utf8_lossy(&stderr).contains("failed to read document"));
}
