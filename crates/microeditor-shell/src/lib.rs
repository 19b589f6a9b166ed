//! Command-line shell pairing a host with a scratch editor.
//!
//! The shell loads configuration, installs telemetry, and runs one session
//! in which a [`HostController`](microeditor_bus::HostController) and a
//! [`ScratchEditor`] talk over an in-process envelope bus. The session
//! summary is printed to stdout as a JSON line; logs go to stderr.

pub mod cli;
pub mod config;
mod error;
pub mod health;
pub mod scratch;
pub mod session;
pub mod telemetry;

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

pub use self::cli::Cli;
pub use self::config::{ConfigLoader, FileConfigLoader};
pub use self::error::ShellError;
pub use self::health::{SessionReporter, StructuredSessionReporter};
pub use self::scratch::ScratchEditor;
pub use self::session::{SessionRequest, SessionSummary, run_session};

/// Runs the shell with the process's own collaborators.
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with(args, stdout, stderr, &FileConfigLoader, &StructuredSessionReporter)
}

/// Runs the shell with substitutable configuration and reporting.
pub fn run_with<I, W, E>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &dyn ConfigLoader,
    reporter: &dyn SessionReporter,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let rendered = error.render();
            if error.use_stderr() {
                let _ = write!(stderr, "{rendered}");
                return ExitCode::from(2);
            }
            let _ = write!(stdout, "{rendered}");
            return ExitCode::SUCCESS;
        }
    };

    match execute(&cli, stdout, loader, reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            reporter.session_failed(&error);
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write>(
    cli: &Cli,
    stdout: &mut W,
    loader: &dyn ConfigLoader,
    reporter: &dyn SessionReporter,
) -> Result<(), ShellError> {
    reporter.session_starting(&cli.document);
    let config = loader.load(cli)?;
    telemetry::initialise(&config)?;
    reporter.session_configured(&config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|source| ShellError::Runtime { source })?;
    let request = SessionRequest {
        document: &cli.document,
        language: cli.resolved_language(),
        edit: &cli.edit,
    };
    let summary = runtime.block_on(run_session(&config, request, reporter))?;
    reporter.session_completed(&summary);

    serde_json::to_writer(&mut *stdout, &summary)
        .map_err(io::Error::from)
        .and_then(|()| writeln!(stdout))
        .map_err(|source| ShellError::Output { source })
}

#[cfg(test)]
mod tests;
