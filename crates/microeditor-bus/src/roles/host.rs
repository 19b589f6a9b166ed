//! Host side of the embedding.

use std::future::Future;
use std::time::Duration;

use microeditor_config::BusConfig;
use microeditor_protocol::messages::{
    ContentRequest, DirtyIndicator, DirtyIndicatorChangeNotification, EditorContent, EditorEdit,
    ElementPositionParams, ElementPositionRequest, GuidedTourRegisterTutorialNotification,
    GuidedTourUserInteractionNotification, InitParams, InitRequest, KeyboardEvent,
    KeyboardEventNotification, LanguageData, LanguageRequest, NewEditNotification, OpenFile,
    OpenFileNotification, PreviewRequest, ReadyNotification, Rect, RedoNotification,
    ResourceContent, ResourceContentParams, ResourceContentRequest, ResourceListParams,
    ResourceListRequest, ResourcesList, SetContentError, SetContentErrorNotification,
    StateControlCommandUpdateNotification, StateControlUpdate, Tutorial, UndoNotification,
    UserInteraction,
};
use tracing::{debug, info};

use crate::bus::{EnvelopeBus, RequestOptions};
use crate::error::{BusError, HandlerFailure};
use crate::registry::RegistrationId;

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

/// Schedule for repeating the initialisation handshake.
///
/// The editor may not be listening yet when the host first asks, so the
/// request is re-sent every `interval` until one attempt is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitPolling {
    /// Wait per attempt before trying again.
    pub interval: Duration,
    /// Attempts before giving up.
    pub max_attempts: u32,
}

impl InitPolling {
    /// Schedule taken from the bus configuration.
    #[must_use]
    pub const fn from_config(config: &BusConfig) -> Self {
        Self {
            interval: config.init_poll_interval(),
            max_attempts: config.init_poll_max_attempts,
        }
    }
}

impl Default for InitPolling {
    fn default() -> Self {
        Self::from_config(&BusConfig::default())
    }
}

/// What a host page sends, answers, and listens to.
#[derive(Debug, Clone)]
pub struct HostController {
    bus: EnvelopeBus,
    polling: InitPolling,
}

impl HostController {
    /// Wraps the host's bus, polling initialisation as configured.
    #[must_use]
    pub fn new(bus: EnvelopeBus) -> Self {
        let polling = InitPolling::from_config(bus.config());
        Self { bus, polling }
    }

    /// Underlying bus.
    #[must_use]
    pub const fn bus(&self) -> &EnvelopeBus {
        &self.bus
    }

    /// Initialisation schedule used by [`HostController::poll_init`].
    #[must_use]
    pub const fn polling(&self) -> InitPolling {
        self.polling
    }

    /// Sends one initialisation request.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the request.
    pub async fn request_init(&self, params: &InitParams) -> Result<(), BusError> {
        self.bus.call::<InitRequest>(params).await
    }

    /// Repeats the initialisation request until the editor answers.
    ///
    /// Returns the attempt that succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InitPollingExhausted`] when no attempt is
    /// answered in time, or the first error other than a timeout.
    pub async fn poll_init(&self, params: &InitParams) -> Result<u32, BusError> {
        self.poll_init_with(params, self.polling).await
    }

    /// [`HostController::poll_init`] with an explicit schedule.
    ///
    /// # Errors
    ///
    /// See [`HostController::poll_init`].
    pub async fn poll_init_with(
        &self,
        params: &InitParams,
        polling: InitPolling,
    ) -> Result<u32, BusError> {
        let options = RequestOptions::with_timeout(polling.interval);
        for attempt in 1..=polling.max_attempts {
            match self.bus.call_with::<InitRequest>(params, options).await {
                Ok(()) => {
                    info!(
                        target: HOST_TARGET,
                        bus = %self.bus.label(),
                        attempt,
                        "editor initialised"
                    );
                    return Ok(attempt);
                }
                Err(BusError::RequestTimeout { .. }) => {
                    debug!(
                        target: HOST_TARGET,
                        bus = %self.bus.label(),
                        attempt,
                        "initialisation not answered; retrying"
                    );
                }
                Err(other) => return Err(other),
            }
        }
        Err(BusError::InitPollingExhausted {
            attempts: polling.max_attempts,
        })
    }

    /// Asks the editor for its current content.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the request.
    pub async fn request_content(&self) -> Result<EditorContent, BusError> {
        self.bus.call::<ContentRequest>(&()).await
    }

    /// Asks the editor for an SVG preview.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the request.
    pub async fn request_preview(&self) -> Result<Option<String>, BusError> {
        self.bus.call::<PreviewRequest>(&()).await
    }

    /// Asks the editor where the element matching `selector` is.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the request.
    pub async fn request_element_position(&self, selector: &str) -> Result<Option<Rect>, BusError> {
        let params = ElementPositionParams {
            selector: selector.to_owned(),
        };
        self.bus.call::<ElementPositionRequest>(&params).await
    }

    /// Tells the editor to undo.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn undo(&self) -> Result<(), BusError> {
        self.bus.send::<UndoNotification>(&())
    }

    /// Tells the editor to redo.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn redo(&self) -> Result<(), BusError> {
        self.bus.send::<RedoNotification>(&())
    }

    /// Forwards a keyboard event to the editor.
    ///
    /// # Errors
    ///
    /// Propagates any [`BusError`] from the notification.
    pub fn keyboard_event(&self, event: &KeyboardEvent) -> Result<(), BusError> {
        self.bus.send::<KeyboardEventNotification>(event)
    }

    /// Answers the editor's language request.
    pub fn on_language_request<F, Fut>(&self, handler: F) -> bool
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LanguageData, HandlerFailure>> + Send + 'static,
    {
        self.bus.handle::<LanguageRequest, _, _>(move |()| handler())
    }

    /// Answers the editor's request for the document.
    pub fn on_content_request<F, Fut>(&self, handler: F) -> bool
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<EditorContent, HandlerFailure>> + Send + 'static,
    {
        self.bus.handle::<ContentRequest, _, _>(move |()| handler())
    }

    /// Answers the editor's resource lookups.
    pub fn on_resource_content_request<F, Fut>(&self, handler: F) -> bool
    where
        F: Fn(ResourceContentParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<ResourceContent>, HandlerFailure>> + Send + 'static,
    {
        self.bus.handle::<ResourceContentRequest, _, _>(handler)
    }

    /// Answers the editor's resource listings.
    pub fn on_resource_list_request<F, Fut>(&self, handler: F) -> bool
    where
        F: Fn(ResourceListParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResourcesList, HandlerFailure>> + Send + 'static,
    {
        self.bus.handle::<ResourceListRequest, _, _>(handler)
    }

    /// Listens for the editor's ready announcement.
    pub fn on_ready<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.bus.subscribe::<ReadyNotification, _>(move |()| handler())
    }

    /// Listens for content the editor failed to load.
    pub fn on_set_content_error<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn(SetContentError) + Send + Sync + 'static,
    {
        self.bus.subscribe::<SetContentErrorNotification, _>(handler)
    }

    /// Listens for dirty flag changes.
    pub fn on_dirty_indicator_change<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn(DirtyIndicator) + Send + Sync + 'static,
    {
        self.bus.subscribe::<DirtyIndicatorChangeNotification, _>(handler)
    }

    /// Listens for new edits.
    pub fn on_new_edit<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn(EditorEdit) + Send + Sync + 'static,
    {
        self.bus.subscribe::<NewEditNotification, _>(handler)
    }

    /// Listens for requests to open a file.
    pub fn on_open_file<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn(OpenFile) + Send + Sync + 'static,
    {
        self.bus.subscribe::<OpenFileNotification, _>(handler)
    }

    /// Listens for undo and redo commands the editor executed itself.
    pub fn on_state_control_command_update<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn(StateControlUpdate) + Send + Sync + 'static,
    {
        self.bus.subscribe::<StateControlCommandUpdateNotification, _>(handler)
    }

    /// Listens for guided tour interactions.
    pub fn on_guided_tour_user_interaction<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn(UserInteraction) + Send + Sync + 'static,
    {
        self.bus.subscribe::<GuidedTourUserInteractionNotification, _>(handler)
    }

    /// Listens for guided tour tutorial registrations.
    pub fn on_guided_tour_register_tutorial<F>(&self, handler: F) -> RegistrationId
    where
        F: Fn(Tutorial) + Send + Sync + 'static,
    {
        self.bus.subscribe::<GuidedTourRegisterTutorialNotification, _>(handler)
    }

    /// Disposes the underlying bus.
    pub fn dispose(&self) -> usize {
        self.bus.dispose()
    }
}
