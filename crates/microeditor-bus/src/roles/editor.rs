//! Editor side of the embedding.

use std::future::Future;

use microeditor_protocol::messages::{
    ContentRequest, DirtyIndicator, DirtyIndicatorChangeNotification, EditorContent, EditorEdit,
    ElementPositionParams, ElementPositionRequest, GuidedTourRegisterTutorialNotification,
    GuidedTourUserInteractionNotification, InitParams, InitRequest, KeyboardEvent,
    KeyboardEventNotification, LanguageData, LanguageRequest, NewEditNotification, OpenFile,
    OpenFileNotification, PreviewRequest, ReadyNotification, Rect, RedoNotification,
    ResourceContent, ResourceContentParams, ResourceContentRequest, ResourceListParams,
    ResourceListRequest, ResourcesList, SetContentError, SetContentErrorNotification,
    StateControlCommand, StateControlCommandUpdateNotification, StateControlUpdate, Tutorial,
    UndoNotification, UserInteraction,
};

use crate::bus::EnvelopeBus;
use crate::error::{BusError, HandlerFailure};
use crate::registry::RegistrationId;

/// What an embedded editor sends, answers, and listens to.
#[derive(Debug, Clone)]
pub struct EditorEnvelope {
    bus: EnvelopeBus,
}

impl EditorEnvelope {
    /// Wraps the editor's bus.
    #[must_use]
    pub const fn new(bus: EnvelopeBus) -> Self {
        Self { bus }
    }

    /// Underlying bus.
    #[must_use]
    pub const fn bus(&self) -> &EnvelopeBus {
        &self.bus
    }

    /// Asks the host which language to edit.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the request.
    pub async fn request_language(&self) -> Result<LanguageData, BusError> {
        self.bus.call::<LanguageRequest>(&()).await
    }

    /// Asks the host for the document to load.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the request.
    pub async fn request_content(&self) -> Result<EditorContent, BusError> {
        self.bus.call::<ContentRequest>(&()).await
    }

    /// Asks the host for a workspace resource.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the request.
    pub async fn request_resource_content(
        &self,
        params: &ResourceContentParams,
    ) -> Result<Option<ResourceContent>, BusError> {
        self.bus.call::<ResourceContentRequest>(params).await
    }

    /// Asks the host to list workspace resources matching `pattern`.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the request.
    pub async fn request_resource_list(&self, pattern: &str) -> Result<ResourcesList, BusError> {
        let params = ResourceListParams {
            pattern: pattern.to_owned(),
        };
        self.bus.call::<ResourceListRequest>(&params).await
    }

    /// Announces that the editor has loaded.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn ready(&self) -> Result<(), BusError> {
        self.bus.send::<ReadyNotification>(&())
    }

    /// Reports content the editor could not load.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn set_content_error(&self, message: &str) -> Result<(), BusError> {
        self.bus.send::<SetContentErrorNotification>(&SetContentError {
            message: message.to_owned(),
        })
    }

    /// Reports a change of the dirty flag.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn dirty_indicator_change(&self, is_dirty: bool) -> Result<(), BusError> {
        self.bus.send::<DirtyIndicatorChangeNotification>(&DirtyIndicator { is_dirty })
    }

    /// Reports a new edit on the undo stack.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn new_edit(&self, id: &str) -> Result<(), BusError> {
        self.bus.send::<NewEditNotification>(&EditorEdit { id: id.to_owned() })
    }

    /// Asks the host to open a file.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn open_file(&self, path: &str) -> Result<(), BusError> {
        self.bus.send::<OpenFileNotification>(&OpenFile {
            path: path.to_owned(),
        })
    }

    /// Reports an undo or redo the editor executed itself.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn state_control_command_update(
        &self,
        command: StateControlCommand,
    ) -> Result<(), BusError> {
        self.bus.send::<StateControlCommandUpdateNotification>(&StateControlUpdate { command })
    }

    /// Reports a guided tour interaction.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn guided_tour_user_interaction(
        &self,
        interaction: &UserInteraction,
    ) -> Result<(), BusError> {
        self.bus.send::<GuidedTourUserInteractionNotification>(interaction)
    }

    /// Registers a guided tour tutorial.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn guided_tour_register_tutorial(&self, tutorial: &Tutorial) -> Result<(), BusError> {
        self.bus.send::<GuidedTourRegisterTutorialNotification>(tutorial)
    }

    /// Answers the host's initialisation request.
    pub fn on_init<F, Fut>(&self, handler: F) -> bool
    where
        F: Fn(InitParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerFailure>> + Send + 'static,
    {
        self.bus.handle::<InitRequest, _, _>(handler)
    }

    /// Answers the host's request for the current content.
    pub fn on_content_request<F, Fut>(&self, handler: F) -> bool
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<EditorContent, HandlerFailure>> + Send + 'static,
    {
        self.bus.handle::<ContentRequest, _, _>(move |()| handler())
    }

    /// Answers the host's request for an SVG preview.
    pub fn on_preview_request<F, Fut>(&self, handler: F) -> bool
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<String>, HandlerFailure>> + Send + 'static,
    {
        self.bus.handle::<PreviewRequest, _, _>(move |()| handler())
    }

    /// Answers the host's request for a guided tour target position.
    pub fn on_element_position_request<F, Fut>(&self, handler: F) -> bool
    where
        F: Fn(ElementPositionParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Rect>, HandlerFailure>> + Send + 'static,
    {
        self.bus.handle::<ElementPositionRequest, _, _>(handler)
    }

    /// Listens for host undo commands.
    pub fn on_undo<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.bus.subscribe::<UndoNotification, _>(move |()| handler())
    }

    /// Listens for host redo commands.
    pub fn on_redo<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.bus.subscribe::<RedoNotification, _>(move |()| handler())
    }

    /// Listens for keyboard events forwarded by the host.
    pub fn on_keyboard_event<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn(KeyboardEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe::<KeyboardEventNotification, _>(handler)
    }

    /// Disposes the underlying bus.
    pub fn dispose(&self) -> usize {
        self.bus.dispose()
    }
}
