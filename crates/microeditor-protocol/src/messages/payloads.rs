//! Payload shapes exchanged by host and editor.
//!
//! Field names follow the camelCase convention of the embedding page.

use serde::{Deserialize, Serialize};

/// Language the editor is asked to edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageData {
    /// Language identifier, for example `bpmn` or `dmn`.
    pub language: String,
    /// Editor implementation chosen by the host, when it matters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    /// Additional resources the editor must load.
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Parameters of the initialisation handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitParams {
    /// Origin of the host page.
    pub origin: String,
    /// Identifier of the bus instance the editor should bind to.
    pub bus_id: String,
}

/// Document content travelling in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorContent {
    /// Full document text.
    pub content: String,
    /// Path of the document, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl EditorContent {
    /// Content without an associated path.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            path: None,
        }
    }

    /// Attaches a path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Encoding of resource content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// UTF-8 text.
    #[default]
    Text,
    /// Base64-encoded bytes.
    Binary,
}

/// Options for a resource content lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContentOptions {
    /// Requested encoding.
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
}

/// Parameters of a resource content lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContentParams {
    /// Workspace-relative resource path.
    pub path: String,
    /// Lookup options.
    #[serde(default)]
    pub opts: ResourceContentOptions,
}

impl ResourceContentParams {
    /// Text lookup for `path`.
    #[must_use]
    pub fn text(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            opts: ResourceContentOptions::default(),
        }
    }
}

/// Content of a workspace resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContent {
    /// Resource path.
    pub path: String,
    /// Content, absent when the resource is empty or unreadable.
    #[serde(default)]
    pub content: Option<String>,
    /// Encoding of `content`.
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
}

/// Parameters of a resource listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceListParams {
    /// Glob pattern to match.
    pub pattern: String,
}

/// Resources matching a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesList {
    /// Pattern that was matched.
    pub pattern: String,
    /// Matching paths.
    pub paths: Vec<String>,
}

/// Selector of a guided tour target element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPositionParams {
    /// CSS-like selector understood by the editor.
    pub selector: String,
}

/// On-screen rectangle of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Horizontal origin.
    pub x: f64,
    /// Vertical origin.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Top edge.
    pub top: f64,
    /// Left edge.
    pub left: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
}

/// Content the editor failed to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetContentError {
    /// Reason reported by the editor.
    pub message: String,
}

/// Dirty flag change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirtyIndicator {
    /// Whether the document has unsaved changes.
    pub is_dirty: bool,
}

/// Edit pushed onto the editor's undo stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorEdit {
    /// Edit identifier.
    pub id: String,
}

/// File the editor wants the host to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFile {
    /// Path of the file.
    pub path: String,
}

/// Undo/redo command executed by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateControlCommand {
    /// An undo.
    Undo,
    /// A redo.
    Redo,
}

/// Wrapper for a state control update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateControlUpdate {
    /// Executed command.
    pub command: StateControlCommand,
}

/// Phase of a keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardEventType {
    /// Key pressed.
    Keydown,
    /// Key released.
    Keyup,
}

/// Keyboard event captured by the host and forwarded to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardEvent {
    /// Press or release.
    #[serde(rename = "type")]
    pub event_type: KeyboardEventType,
    /// Logical key value.
    pub key: String,
    /// Physical key code.
    pub code: String,
    /// Alt modifier.
    #[serde(default)]
    pub alt_key: bool,
    /// Control modifier.
    #[serde(default)]
    pub ctrl_key: bool,
    /// Shift modifier.
    #[serde(default)]
    pub shift_key: bool,
    /// Meta modifier.
    #[serde(default)]
    pub meta_key: bool,
}

/// User interaction observed during a guided tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInteraction {
    /// Action name, for example `CLICK`.
    pub action: String,
    /// Target the action applied to.
    pub target: String,
}

/// Guided tour tutorial registered by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutorial {
    /// Tutorial label.
    pub label: String,
    /// Opaque step descriptions, interpreted by the tour UI.
    #[serde(default)]
    pub steps: Vec<serde_json::Value>,
}
