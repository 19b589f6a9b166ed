//! Minimal in-process editor driven over the envelope bus.
//!
//! The scratch editor keeps the document as plain text with linear undo and
//! redo stacks. It answers the host's requests and reports its state through
//! editor notifications, which is enough to exercise every part of the
//! protocol without a real UI.

use std::sync::Arc;

use futures::future;
use microeditor_bus::{BusError, EditorEnvelope};
use microeditor_protocol::messages::{EditorContent, Rect, StateControlCommand};
use parking_lot::Mutex;
use tracing::{debug, warn};

const SCRATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::scratch");
const LINE_HEIGHT: u16 = 16;
const CHAR_WIDTH: u16 = 8;

#[derive(Debug, Default)]
struct ScratchState {
    initialised: bool,
    language: Option<String>,
    path: Option<String>,
    content: String,
    undo: Vec<String>,
    redo: Vec<String>,
    edits: u64,
}

impl ScratchState {
    fn snapshot(&self) -> EditorContent {
        EditorContent {
            content: self.content.clone(),
            path: self.path.clone(),
        }
    }

    fn step(&mut self, command: StateControlCommand) -> bool {
        let (from, to) = match command {
            StateControlCommand::Undo => (&mut self.undo, &mut self.redo),
            StateControlCommand::Redo => (&mut self.redo, &mut self.undo),
        };
        let Some(previous) = from.pop() else {
            return false;
        };
        to.push(std::mem::replace(&mut self.content, previous));
        true
    }

    fn is_dirty(&self) -> bool {
        !self.undo.is_empty()
    }
}

/// Text editor living on the editor side of a bus.
#[derive(Debug, Clone)]
pub struct ScratchEditor {
    envelope: EditorEnvelope,
    state: Arc<Mutex<ScratchState>>,
}

impl ScratchEditor {
    /// Registers the editor's handlers on `envelope`.
    #[must_use]
    pub fn attach(envelope: EditorEnvelope) -> Self {
        let editor = Self {
            envelope,
            state: Arc::new(Mutex::new(ScratchState::default())),
        };
        editor.register_handlers();
        editor
    }

    fn register_handlers(&self) {
        let init_state = Arc::clone(&self.state);
        self.envelope.on_init(move |params| {
            debug!(
                target: SCRATCH_TARGET,
                origin = %params.origin,
                bus_id = %params.bus_id,
                "initialised by host"
            );
            init_state.lock().initialised = true;
            future::ready(Ok(()))
        });

        let content_state = Arc::clone(&self.state);
        self.envelope
            .on_content_request(move || future::ready(Ok(content_state.lock().snapshot())));

        let preview_state = Arc::clone(&self.state);
        self.envelope.on_preview_request(move || {
            future::ready(Ok(Some(render_preview(&preview_state.lock().content))))
        });

        let position_state = Arc::clone(&self.state);
        self.envelope.on_element_position_request(move |params| {
            future::ready(Ok(locate(&position_state.lock().content, &params.selector)))
        });

        let undoing = self.clone();
        self.envelope.on_undo(move || undoing.apply_host_command(StateControlCommand::Undo));
        let redoing = self.clone();
        self.envelope.on_redo(move || redoing.apply_host_command(StateControlCommand::Redo));
    }

    fn apply_host_command(&self, command: StateControlCommand) {
        let (applied, dirty) = {
            let mut state = self.state.lock();
            (state.step(command), state.is_dirty())
        };
        if !applied {
            debug!(target: SCRATCH_TARGET, ?command, "nothing to apply");
            return;
        }
        if let Err(error) = self.envelope.dirty_indicator_change(dirty) {
            warn!(target: SCRATCH_TARGET, %error, "failed to report dirty state");
        }
    }

    /// Fetches language and document from the host, then announces
    /// readiness.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the exchange.
    pub async fn load(&self) -> Result<(), BusError> {
        let language = self.envelope.request_language().await?;
        let document = self.envelope.request_content().await?;
        {
            let mut state = self.state.lock();
            state.language = Some(language.language);
            state.path = document.path;
            state.content = document.content;
            state.undo.clear();
            state.redo.clear();
        }
        self.envelope.ready()
    }

    /// Appends `text` as one undoable edit.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notifications.
    pub fn edit(&self, text: &str) -> Result<(), BusError> {
        let id = {
            let mut state = self.state.lock();
            let previous = state.content.clone();
            state.undo.push(previous);
            state.redo.clear();
            state.content.push_str(text);
            state.edits += 1;
            format!("edit-{}", state.edits)
        };
        self.envelope.new_edit(&id)?;
        self.envelope.dirty_indicator_change(true)
    }

    /// Undoes the last edit on the editor's own initiative.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notifications.
    pub fn undo(&self) -> Result<bool, BusError> {
        self.local_command(StateControlCommand::Undo)
    }

    /// Redoes the last undone edit on the editor's own initiative.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notifications.
    pub fn redo(&self) -> Result<bool, BusError> {
        self.local_command(StateControlCommand::Redo)
    }

    fn local_command(&self, command: StateControlCommand) -> Result<bool, BusError> {
        let (applied, dirty) = {
            let mut state = self.state.lock();
            (state.step(command), state.is_dirty())
        };
        if applied {
            self.envelope.state_control_command_update(command)?;
            self.envelope.dirty_indicator_change(dirty)?;
        }
        Ok(applied)
    }

    /// Whether the host has completed the initialisation handshake.
    #[must_use]
    pub fn is_initialised(&self) -> bool {
        self.state.lock().initialised
    }

    /// Language reported by the host.
    #[must_use]
    pub fn language(&self) -> Option<String> {
        self.state.lock().language.clone()
    }

    /// Current document text.
    #[must_use]
    pub fn content(&self) -> String {
        self.state.lock().content.clone()
    }

    /// Number of edits made since the document was loaded.
    #[must_use]
    pub fn edits(&self) -> u64 {
        self.state.lock().edits
    }

    /// Whether there is anything to undo.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state.lock().is_dirty()
    }

    /// Editor facade the scratch editor is attached to.
    #[must_use]
    pub const fn envelope(&self) -> &EditorEnvelope {
        &self.envelope
    }
}

fn render_preview(content: &str) -> String {
    let lines = content.lines().count();
    let widest = content.lines().map(str::len).max().unwrap_or(0);
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">\
         <text x=\"0\" y=\"{LINE_HEIGHT}\">{lines} lines</text></svg>",
        widest.saturating_mul(usize::from(CHAR_WIDTH)),
        lines.saturating_mul(usize::from(LINE_HEIGHT)),
    )
}

fn locate(content: &str, selector: &str) -> Option<Rect> {
    let (line, text) = content
        .lines()
        .enumerate()
        .find(|(_, text)| text.contains(selector))?;
    let column = u32::try_from(text.find(selector)?).ok()?;
    let row = u32::try_from(line).ok()?;
    let length = u32::try_from(selector.len()).ok()?;

    let left = column.checked_mul(u32::from(CHAR_WIDTH))?;
    let top = row.checked_mul(u32::from(LINE_HEIGHT))?;
    let width = length.checked_mul(u32::from(CHAR_WIDTH))?;
    Some(Rect {
        x: f64::from(left),
        y: f64::from(top),
        width: f64::from(width),
        height: f64::from(LINE_HEIGHT),
        top: f64::from(top),
        left: f64::from(left),
        right: f64::from(left.checked_add(width)?),
        bottom: f64::from(top.checked_add(u32::from(LINE_HEIGHT))?),
    })
}
