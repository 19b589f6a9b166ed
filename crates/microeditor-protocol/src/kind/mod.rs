//! Closed registry of envelope message kinds.
//!
//! Both ends of the bus compile against the same registry; there is no
//! capability negotiation. Wire tags are dense integers in declaration
//! order, so a new kind must be appended and shipped to both sides at once.
//!
//! Kinds come in three families. [`RequestKind`] names a two-way exchange
//! and owns both of its wire kinds, which makes the request/return pairing a
//! property of the type rather than a table that can drift. [`NotifyKind`]
//! names a one-way message. [`MessageKind`] is the flat wire-level view.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Every message kind the bus can carry, tagged with its wire integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(try_from = "u64", into = "u8")]
#[repr(u8)]
pub enum MessageKind {
    /// Editor asks the host which language it is editing.
    RequestLanguage = 0,
    /// Host answers [`MessageKind::RequestLanguage`].
    ReturnLanguage = 1,
    /// Host asks the editor to initialise against an origin and bus id.
    RequestInit = 2,
    /// Editor acknowledges [`MessageKind::RequestInit`].
    ReturnInit = 3,
    /// Either side asks the other for the current document content.
    RequestContent = 4,
    /// Answers [`MessageKind::RequestContent`].
    ReturnContent = 5,
    /// Editor reports that the supplied content could not be loaded.
    NotifySetContentError = 6,
    /// Editor reports a change of its dirty flag.
    NotifyDirtyIndicatorChange = 7,
    /// Editor reports that it finished loading.
    NotifyReady = 8,
    /// Editor asks the host for the content of a workspace resource.
    RequestResourceContent = 9,
    /// Host answers [`MessageKind::RequestResourceContent`].
    ReturnResourceContent = 10,
    /// Editor asks the host to list workspace resources.
    RequestResourceList = 11,
    /// Host answers [`MessageKind::RequestResourceList`].
    ReturnResourceList = 12,
    /// Host asks the editor for a rendered preview.
    RequestPreview = 13,
    /// Editor answers [`MessageKind::RequestPreview`].
    ReturnPreview = 14,
    /// Host tells the editor to undo.
    NotifyEditorUndo = 15,
    /// Host tells the editor to redo.
    NotifyEditorRedo = 16,
    /// Editor reports a new edit on its undo stack.
    NotifyEditorNewEdit = 17,
    /// Editor asks the host to open another file.
    NotifyEditorOpenFile = 18,
    /// Editor reports an undo/redo command it executed on its own.
    NotifyStateControlCommandUpdate = 19,
    /// Host forwards a keyboard event captured outside the editor.
    NotifyChannelKeyboardEvent = 20,
    /// Editor reports a user interaction relevant to a guided tour.
    NotifyGuidedTourUserInteraction = 21,
    /// Editor registers a guided tour tutorial with the host.
    NotifyGuidedTourRegisterTutorial = 22,
    /// Host asks the editor where a tour target element is on screen.
    RequestGuidedTourElementPosition = 23,
    /// Editor answers [`MessageKind::RequestGuidedTourElementPosition`].
    ReturnGuidedTourElementPosition = 24,
}

impl MessageKind {
    /// All kinds in wire-tag order.
    pub const ALL: [Self; 25] = [
        Self::RequestLanguage,
        Self::ReturnLanguage,
        Self::RequestInit,
        Self::ReturnInit,
        Self::RequestContent,
        Self::ReturnContent,
        Self::NotifySetContentError,
        Self::NotifyDirtyIndicatorChange,
        Self::NotifyReady,
        Self::RequestResourceContent,
        Self::ReturnResourceContent,
        Self::RequestResourceList,
        Self::ReturnResourceList,
        Self::RequestPreview,
        Self::ReturnPreview,
        Self::NotifyEditorUndo,
        Self::NotifyEditorRedo,
        Self::NotifyEditorNewEdit,
        Self::NotifyEditorOpenFile,
        Self::NotifyStateControlCommandUpdate,
        Self::NotifyChannelKeyboardEvent,
        Self::NotifyGuidedTourUserInteraction,
        Self::NotifyGuidedTourRegisterTutorial,
        Self::RequestGuidedTourElementPosition,
        Self::ReturnGuidedTourElementPosition,
    ];

    /// Integer written to the `type` field on the wire.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Classifies the kind into its family.
    #[must_use]
    pub const fn family(self) -> MessageFamily {
        match self {
            Self::RequestLanguage => MessageFamily::Request(RequestKind::Language),
            Self::ReturnLanguage => MessageFamily::Return(RequestKind::Language),
            Self::RequestInit => MessageFamily::Request(RequestKind::Init),
            Self::ReturnInit => MessageFamily::Return(RequestKind::Init),
            Self::RequestContent => MessageFamily::Request(RequestKind::Content),
            Self::ReturnContent => MessageFamily::Return(RequestKind::Content),
            Self::RequestResourceContent => MessageFamily::Request(RequestKind::ResourceContent),
            Self::ReturnResourceContent => MessageFamily::Return(RequestKind::ResourceContent),
            Self::RequestResourceList => MessageFamily::Request(RequestKind::ResourceList),
            Self::ReturnResourceList => MessageFamily::Return(RequestKind::ResourceList),
            Self::RequestPreview => MessageFamily::Request(RequestKind::Preview),
            Self::ReturnPreview => MessageFamily::Return(RequestKind::Preview),
            Self::RequestGuidedTourElementPosition => {
                MessageFamily::Request(RequestKind::GuidedTourElementPosition)
            }
            Self::ReturnGuidedTourElementPosition => {
                MessageFamily::Return(RequestKind::GuidedTourElementPosition)
            }
            Self::NotifySetContentError => MessageFamily::Notify(NotifyKind::SetContentError),
            Self::NotifyDirtyIndicatorChange => {
                MessageFamily::Notify(NotifyKind::DirtyIndicatorChange)
            }
            Self::NotifyReady => MessageFamily::Notify(NotifyKind::Ready),
            Self::NotifyEditorUndo => MessageFamily::Notify(NotifyKind::EditorUndo),
            Self::NotifyEditorRedo => MessageFamily::Notify(NotifyKind::EditorRedo),
            Self::NotifyEditorNewEdit => MessageFamily::Notify(NotifyKind::EditorNewEdit),
            Self::NotifyEditorOpenFile => MessageFamily::Notify(NotifyKind::EditorOpenFile),
            Self::NotifyStateControlCommandUpdate => {
                MessageFamily::Notify(NotifyKind::StateControlCommandUpdate)
            }
            Self::NotifyChannelKeyboardEvent => {
                MessageFamily::Notify(NotifyKind::ChannelKeyboardEvent)
            }
            Self::NotifyGuidedTourUserInteraction => {
                MessageFamily::Notify(NotifyKind::GuidedTourUserInteraction)
            }
            Self::NotifyGuidedTourRegisterTutorial => {
                MessageFamily::Notify(NotifyKind::GuidedTourRegisterTutorial)
            }
        }
    }

    /// Whether envelopes of this kind must carry a correlation id.
    #[must_use]
    pub const fn is_correlated(self) -> bool {
        !matches!(self.family(), MessageFamily::Notify(_))
    }
}

impl From<MessageKind> for u8 {
    fn from(kind: MessageKind) -> Self {
        kind.tag()
    }
}

impl TryFrom<u64> for MessageKind {
    type Error = UnknownMessageKind;

    fn try_from(tag: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| u64::from(kind.tag()) == tag)
            .ok_or(UnknownMessageKind { tag })
    }
}

/// Raised when a wire tag does not name a registered kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown message type tag {tag}")]
pub struct UnknownMessageKind {
    /// Tag found on the wire.
    pub tag: u64,
}

/// Family a [`MessageKind`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageFamily {
    /// Opens a request/return exchange.
    Request(RequestKind),
    /// Closes the exchange opened by the contained request kind.
    Return(RequestKind),
    /// One-way message with no reply.
    Notify(NotifyKind),
}

/// Two-way exchanges. Each variant owns one request and one return kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestKind {
    /// Language lookup.
    Language,
    /// Editor initialisation handshake.
    Init,
    /// Current document content.
    Content,
    /// Content of one workspace resource.
    ResourceContent,
    /// Listing of workspace resources.
    ResourceList,
    /// Rendered preview of the document.
    Preview,
    /// On-screen position of a guided tour target.
    GuidedTourElementPosition,
}

impl RequestKind {
    /// All request kinds in wire order.
    pub const ALL: [Self; 7] = [
        Self::Language,
        Self::Init,
        Self::Content,
        Self::ResourceContent,
        Self::ResourceList,
        Self::Preview,
        Self::GuidedTourElementPosition,
    ];

    /// Wire kind that opens this exchange.
    #[must_use]
    pub const fn request_kind(self) -> MessageKind {
        match self {
            Self::Language => MessageKind::RequestLanguage,
            Self::Init => MessageKind::RequestInit,
            Self::Content => MessageKind::RequestContent,
            Self::ResourceContent => MessageKind::RequestResourceContent,
            Self::ResourceList => MessageKind::RequestResourceList,
            Self::Preview => MessageKind::RequestPreview,
            Self::GuidedTourElementPosition => MessageKind::RequestGuidedTourElementPosition,
        }
    }

    /// Wire kind that answers this exchange.
    #[must_use]
    pub const fn return_kind(self) -> MessageKind {
        match self {
            Self::Language => MessageKind::ReturnLanguage,
            Self::Init => MessageKind::ReturnInit,
            Self::Content => MessageKind::ReturnContent,
            Self::ResourceContent => MessageKind::ReturnResourceContent,
            Self::ResourceList => MessageKind::ReturnResourceList,
            Self::Preview => MessageKind::ReturnPreview,
            Self::GuidedTourElementPosition => MessageKind::ReturnGuidedTourElementPosition,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.request_kind(), formatter)
    }
}

/// One-way message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NotifyKind {
    /// Content could not be applied by the editor.
    SetContentError,
    /// Dirty flag changed.
    DirtyIndicatorChange,
    /// Editor finished loading.
    Ready,
    /// Undo requested by the host.
    EditorUndo,
    /// Redo requested by the host.
    EditorRedo,
    /// Editor pushed a new edit.
    EditorNewEdit,
    /// Editor wants another file opened.
    EditorOpenFile,
    /// Editor ran an undo/redo command itself.
    StateControlCommandUpdate,
    /// Keyboard event forwarded by the host.
    ChannelKeyboardEvent,
    /// Guided tour interaction.
    GuidedTourUserInteraction,
    /// Guided tour tutorial registration.
    GuidedTourRegisterTutorial,
}

impl NotifyKind {
    /// All notify kinds in wire order.
    pub const ALL: [Self; 11] = [
        Self::SetContentError,
        Self::DirtyIndicatorChange,
        Self::Ready,
        Self::EditorUndo,
        Self::EditorRedo,
        Self::EditorNewEdit,
        Self::EditorOpenFile,
        Self::StateControlCommandUpdate,
        Self::ChannelKeyboardEvent,
        Self::GuidedTourUserInteraction,
        Self::GuidedTourRegisterTutorial,
    ];

    /// Wire kind carrying this notification.
    #[must_use]
    pub const fn message_kind(self) -> MessageKind {
        match self {
            Self::SetContentError => MessageKind::NotifySetContentError,
            Self::DirtyIndicatorChange => MessageKind::NotifyDirtyIndicatorChange,
            Self::Ready => MessageKind::NotifyReady,
            Self::EditorUndo => MessageKind::NotifyEditorUndo,
            Self::EditorRedo => MessageKind::NotifyEditorRedo,
            Self::EditorNewEdit => MessageKind::NotifyEditorNewEdit,
            Self::EditorOpenFile => MessageKind::NotifyEditorOpenFile,
            Self::StateControlCommandUpdate => MessageKind::NotifyStateControlCommandUpdate,
            Self::ChannelKeyboardEvent => MessageKind::NotifyChannelKeyboardEvent,
            Self::GuidedTourUserInteraction => MessageKind::NotifyGuidedTourUserInteraction,
            Self::GuidedTourRegisterTutorial => MessageKind::NotifyGuidedTourRegisterTutorial,
        }
    }
}

impl From<NotifyKind> for MessageKind {
    fn from(kind: NotifyKind) -> Self {
        kind.message_kind()
    }
}

impl fmt::Display for NotifyKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.message_kind(), formatter)
    }
}
