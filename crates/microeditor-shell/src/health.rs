//! Structured reporting of session lifecycle events.

use std::path::Path;
use std::sync::Arc;

use microeditor_config::Config;

use crate::error::ShellError;
use crate::session::SessionSummary;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer for the milestones of a shell run.
pub trait SessionReporter: Send + Sync {
    /// Invoked before configuration is loaded.
    fn session_starting(&self, document: &Path);

    /// Invoked once configuration and telemetry are in place.
    fn session_configured(&self, config: &Config);

    /// Invoked when the editor answers the initialisation handshake.
    fn editor_initialised(&self, attempts: u32);

    /// Invoked after the session completes.
    fn session_completed(&self, summary: &SessionSummary);

    /// Invoked when the run fails.
    fn session_failed(&self, error: &ShellError);
}

impl<T> SessionReporter for Arc<T>
where
    T: SessionReporter + ?Sized,
{
    fn session_starting(&self, document: &Path) {
        (**self).session_starting(document);
    }

    fn session_configured(&self, config: &Config) {
        (**self).session_configured(config);
    }

    fn editor_initialised(&self, attempts: u32) {
        (**self).editor_initialised(attempts);
    }

    fn session_completed(&self, summary: &SessionSummary) {
        (**self).session_completed(summary);
    }

    fn session_failed(&self, error: &ShellError) {
        (**self).session_failed(error);
    }
}

/// Reporter that emits every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredSessionReporter;

impl SessionReporter for StructuredSessionReporter {
    fn session_starting(&self, document: &Path) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_starting",
            document = %document.display(),
            "starting editor session"
        );
    }

    fn session_configured(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_configured",
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            request_timeout_ms = ?config.bus().request_timeout_ms,
            unhandled_requests = %config.bus().unhandled_requests,
            "configuration resolved"
        );
    }

    fn editor_initialised(&self, attempts: u32) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "editor_initialised",
            attempts,
            "editor answered initialisation"
        );
    }

    fn session_completed(&self, summary: &SessionSummary) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_completed",
            language = %summary.language,
            edits = summary.edits.len(),
            dirty = summary.dirty,
            "editor session completed"
        );
    }

    fn session_failed(&self, error: &ShellError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "session_failed",
            error = %error,
            "editor session failed"
        );
    }
}
