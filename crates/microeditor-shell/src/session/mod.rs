//! One host/editor session over an in-process link.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use futures::future;
use microeditor_bus::{EditorEnvelope, EnvelopeBus, HostController, memory};
use microeditor_config::Config;
use microeditor_protocol::messages::{EditorContent, InitParams, LanguageData, StateControlCommand};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ShellError;
use crate::health::SessionReporter;
use crate::scratch::ScratchEditor;

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");
const HOST_ORIGIN: &str = "microeditor-shell";

/// What a session did, printed as JSON when the shell exits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Document that was opened.
    pub document: String,
    /// Language reported to the editor.
    pub language: String,
    /// Initialisation attempts until the editor answered.
    pub init_attempts: u32,
    /// Whether the editor announced readiness.
    pub ready: bool,
    /// Edits the host was notified about.
    pub edits: Vec<String>,
    /// Dirty flag after the last notification.
    pub dirty: bool,
    /// Undo and redo commands the editor reported executing itself.
    pub state_commands: Vec<String>,
    /// Size of the content returned by the editor at the end.
    pub content_bytes: usize,
    /// Size of the preview returned by the editor.
    pub preview_bytes: usize,
}

/// Editor events observed by the host.
#[derive(Debug, Default)]
struct HostLog {
    ready: bool,
    dirty: bool,
    edits: Vec<String>,
    state_commands: Vec<String>,
}

/// Parameters of one session.
#[derive(Debug, Clone)]
pub struct SessionRequest<'a> {
    /// Document to open.
    pub document: &'a Path,
    /// Language to report.
    pub language: String,
    /// Text the editor appends as its demonstration edit.
    pub edit: &'a str,
}

/// Runs a host and a [`ScratchEditor`] against each other.
///
/// The host polls the editor until it is initialised, the editor loads the
/// document and makes one edit, the host undoes and redoes it, and finally
/// the host reads back content and preview. Both buses are disposed before
/// returning, whatever the outcome.
///
/// # Errors
///
/// Returns [`ShellError::Document`] when the document cannot be read and
/// [`ShellError::Bus`] when any exchange fails.
pub async fn run_session(
    config: &Config,
    request: SessionRequest<'_>,
    reporter: &dyn SessionReporter,
) -> Result<SessionSummary, ShellError> {
    let text = fs::read_to_string(request.document).map_err(|source| ShellError::Document {
        path: request.document.to_path_buf(),
        source,
    })?;

    let (host_end, editor_end) = memory::duplex();
    let (host_transport, host_incoming) = host_end.into_parts();
    let (editor_transport, editor_incoming) = editor_end.into_parts();
    let host_bus = EnvelopeBus::new("host", host_transport, config.bus().clone());
    let editor_bus = EnvelopeBus::new("editor", editor_transport, config.bus().clone());
    let serving = [
        spawn_serve(&host_bus, host_incoming),
        spawn_serve(&editor_bus, editor_incoming),
    ];

    let host = HostController::new(host_bus);
    let editor = ScratchEditor::attach(EditorEnvelope::new(editor_bus));
    let log = Arc::new(Mutex::new(HostLog::default()));
    serve_document(&host, &request, text);
    observe_editor(&host, &log);

    let outcome = converse(&host, &editor, &request, reporter).await;

    let rejected = host.dispose() + editor.envelope().dispose();
    if rejected > 0 {
        warn!(target: SESSION_TARGET, rejected, "requests still pending at shutdown");
    }
    for handle in serving {
        if let Err(error) = handle.await {
            warn!(target: SESSION_TARGET, %error, "serve task ended abnormally");
        }
    }

    let (init_attempts, content_bytes, preview_bytes) = outcome?;
    let observed = log.lock();
    Ok(SessionSummary {
        document: request.document.display().to_string(),
        language: request.language,
        init_attempts,
        ready: observed.ready,
        edits: observed.edits.clone(),
        dirty: observed.dirty,
        state_commands: observed.state_commands.clone(),
        content_bytes,
        preview_bytes,
    })
}

fn spawn_serve(
    bus: &EnvelopeBus,
    incoming: futures::channel::mpsc::UnboundedReceiver<serde_json::Value>,
) -> JoinHandle<()> {
    let serving = bus.clone();
    tokio::spawn(async move { serving.serve(incoming).await })
}

fn serve_document(host: &HostController, request: &SessionRequest<'_>, text: String) {
    let language = LanguageData {
        language: request.language.clone(),
        editor_id: None,
        resources: Vec::new(),
    };
    host.on_language_request(move || future::ready(Ok(language.clone())));

    let document = EditorContent::new(text).with_path(request.document.display().to_string());
    host.on_content_request(move || future::ready(Ok(document.clone())));
}

fn observe_editor(host: &HostController, log: &Arc<Mutex<HostLog>>) {
    let ready = Arc::clone(log);
    host.on_ready(move || ready.lock().ready = true);

    let dirty = Arc::clone(log);
    host.on_dirty_indicator_change(move |indicator| dirty.lock().dirty = indicator.is_dirty);

    let edits = Arc::clone(log);
    host.on_new_edit(move |edit| edits.lock().edits.push(edit.id));

    let commands = Arc::clone(log);
    host.on_state_control_command_update(move |update| {
        let label = match update.command {
            StateControlCommand::Undo => "undo",
            StateControlCommand::Redo => "redo",
        };
        commands.lock().state_commands.push(label.to_owned());
    });

    host.on_set_content_error(|error| {
        warn!(target: SESSION_TARGET, message = %error.message, "editor rejected content");
    });
    host.on_open_file(|file| {
        debug!(target: SESSION_TARGET, path = %file.path, "editor asked to open a file");
    });
}

async fn converse(
    host: &HostController,
    editor: &ScratchEditor,
    request: &SessionRequest<'_>,
    reporter: &dyn SessionReporter,
) -> Result<(u32, usize, usize), ShellError> {
    let params = InitParams {
        origin: HOST_ORIGIN.to_owned(),
        bus_id: String::from("shell-bus"),
    };
    let attempts = host.poll_init(&params).await?;
    reporter.editor_initialised(attempts);

    editor.load().await?;
    editor.edit(request.edit)?;
    host.undo()?;
    host.redo()?;
    // Notifications are queued ahead of the request, so its return means
    // the editor has applied them.
    let replayed = host.request_content().await?;
    debug!(
        target: SESSION_TARGET,
        content_bytes = replayed.content.len(),
        "host undo and redo applied"
    );
    editor.undo()?;
    editor.redo()?;

    let content = host.request_content().await?;
    let preview = host.request_preview().await?.unwrap_or_default();
    debug!(
        target: SESSION_TARGET,
        content_bytes = content.content.len(),
        preview_bytes = preview.len(),
        "read back editor state"
    );
    Ok((attempts, content.content.len(), preview.len()))
}
