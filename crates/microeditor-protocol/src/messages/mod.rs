//! Typed catalogue of the messages host and editor exchange.
//!
//! Every request kind has a marker implementing [`RequestMessage`], every
//! notify kind one implementing [`NotifyMessage`]. The markers bind a kind to
//! its payload types so typed bus calls cannot mix them up; the wire still
//! carries plain JSON.

mod payloads;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::kind::{NotifyKind, RequestKind};

pub use payloads::{
    ContentType, DirtyIndicator, EditorContent, EditorEdit, ElementPositionParams, InitParams,
    KeyboardEvent, KeyboardEventType, LanguageData, OpenFile, Rect, ResourceContent,
    ResourceContentOptions, ResourceContentParams, ResourceListParams, ResourcesList,
    SetContentError, StateControlCommand, StateControlUpdate, Tutorial, UserInteraction,
};

/// A request kind together with its parameter and return payload types.
pub trait RequestMessage {
    /// Request kind on the wire.
    const KIND: RequestKind;
    /// Payload sent with the request.
    type Params: Serialize + DeserializeOwned + Send + 'static;
    /// Payload carried back by the return.
    type Output: Serialize + DeserializeOwned + Send + 'static;
}

/// A notify kind together with its payload type.
pub trait NotifyMessage {
    /// Notify kind on the wire.
    const KIND: NotifyKind;
    /// Payload carried by the notification.
    type Payload: Serialize + DeserializeOwned + Send + 'static;
}

macro_rules! request_message {
    ($(#[$meta:meta])* $name:ident, $kind:ident, $params:ty => $output:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name;

        impl RequestMessage for $name {
            const KIND: RequestKind = RequestKind::$kind;
            type Params = $params;
            type Output = $output;
        }
    };
}

macro_rules! notify_message {
    ($(#[$meta:meta])* $name:ident, $kind:ident, $payload:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name;

        impl NotifyMessage for $name {
            const KIND: NotifyKind = NotifyKind::$kind;
            type Payload = $payload;
        }
    };
}

request_message!(
    /// Editor asks the host for the language being edited.
    LanguageRequest, Language, () => LanguageData
);
request_message!(
    /// Host initialises the editor.
    InitRequest, Init, InitParams => ()
);
request_message!(
    /// Either side asks for the current document content.
    ContentRequest, Content, () => EditorContent
);
request_message!(
    /// Editor asks the host for a workspace resource.
    ResourceContentRequest, ResourceContent, ResourceContentParams => Option<ResourceContent>
);
request_message!(
    /// Editor asks the host to list workspace resources.
    ResourceListRequest, ResourceList, ResourceListParams => ResourcesList
);
request_message!(
    /// Host asks the editor for an SVG preview.
    PreviewRequest, Preview, () => Option<String>
);
request_message!(
    /// Host asks the editor where a guided tour target is.
    ElementPositionRequest, GuidedTourElementPosition, ElementPositionParams => Option<Rect>
);

notify_message!(
    /// Editor could not load the supplied content.
    SetContentErrorNotification, SetContentError, SetContentError
);
notify_message!(
    /// Editor dirty flag changed.
    DirtyIndicatorChangeNotification, DirtyIndicatorChange, DirtyIndicator
);
notify_message!(
    /// Editor finished loading.
    ReadyNotification, Ready, ()
);
notify_message!(
    /// Host requests an undo.
    UndoNotification, EditorUndo, ()
);
notify_message!(
    /// Host requests a redo.
    RedoNotification, EditorRedo, ()
);
notify_message!(
    /// Editor pushed a new edit.
    NewEditNotification, EditorNewEdit, EditorEdit
);
notify_message!(
    /// Editor asks the host to open a file.
    OpenFileNotification, EditorOpenFile, OpenFile
);
notify_message!(
    /// Editor executed an undo or redo itself.
    StateControlCommandUpdateNotification, StateControlCommandUpdate, StateControlUpdate
);
notify_message!(
    /// Host forwards a keyboard event.
    KeyboardEventNotification, ChannelKeyboardEvent, KeyboardEvent
);
notify_message!(
    /// Editor reports a guided tour interaction.
    GuidedTourUserInteractionNotification, GuidedTourUserInteraction, UserInteraction
);
notify_message!(
    /// Editor registers a guided tour tutorial.
    GuidedTourRegisterTutorialNotification, GuidedTourRegisterTutorial, Tutorial
);

/// Serialises a typed payload for an envelope, mapping unit/`null` to absent.
///
/// # Errors
///
/// Returns the serialiser error when the value cannot be represented as
/// JSON.
pub fn encode_payload<T: Serialize>(value: &T) -> Result<Option<Value>, serde_json::Error> {
    let encoded = serde_json::to_value(value)?;
    Ok((!encoded.is_null()).then_some(encoded))
}

/// Deserialises a typed payload from an envelope, treating absent as `null`.
///
/// # Errors
///
/// Returns the deserialiser error when the payload does not match `T`.
pub fn decode_payload<T: DeserializeOwned>(data: Option<Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(data.unwrap_or(Value::Null))
}
