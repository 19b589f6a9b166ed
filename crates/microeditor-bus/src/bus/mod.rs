//! Symmetric envelope bus.
//!
//! Host and editor run the same [`EnvelopeBus`]; only the handlers they
//! register differ. Outgoing requests are tracked until their return
//! arrives, incoming requests are answered by the registered handler, and
//! incoming notifications fan out to every subscriber.

mod dispatch;
mod typed;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::channel::oneshot;
use microeditor_config::BusConfig;
use microeditor_protocol::{CorrelationId, Envelope, NotifyKind, RequestKind};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{BusError, HandlerFailure};
use crate::registry::{HandlerRegistry, NotifyHandler, RegistrationId, RequestHandler};
use crate::tracker::PendingRequestTracker;
use crate::transport::Transport;

pub use dispatch::DispatchOutcome;

pub(crate) const BUS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bus");

/// Per-request overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Deadline for this request, replacing the configured default.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Options with an explicit deadline.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

struct BusInner {
    label: String,
    transport: Box<dyn Transport>,
    config: BusConfig,
    pending: Mutex<PendingRequestTracker>,
    handlers: Mutex<HandlerRegistry>,
    disposed: AtomicBool,
    dispose_listeners: Mutex<Vec<oneshot::Sender<()>>>,
}

/// One endpoint of the envelope protocol.
///
/// Cloning yields another handle to the same bus.
///
/// # Examples
///
/// ```
/// use microeditor_bus::{EnvelopeBus, memory};
/// use microeditor_config::BusConfig;
/// use microeditor_protocol::NotifyKind;
///
/// let (host_end, _editor_end) = memory::duplex();
/// let bus = EnvelopeBus::new("host", host_end.transport, BusConfig::default());
/// bus.notify(NotifyKind::EditorUndo, None).expect("editor end is alive");
/// assert_eq!(bus.dispose(), 0);
/// ```
#[derive(Clone)]
pub struct EnvelopeBus {
    inner: Arc<BusInner>,
}

impl std::fmt::Debug for EnvelopeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeBus")
            .field("label", &self.inner.label)
            .field("pending", &self.pending_requests())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl EnvelopeBus {
    /// Creates a bus sending through `transport`.
    ///
    /// `label` names the endpoint in log records, for example `host`.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        transport: impl Transport + 'static,
        config: BusConfig,
    ) -> Self {
        Self {
            inner: Arc::new(BusInner {
                label: label.into(),
                transport: Box::new(transport),
                config,
                pending: Mutex::new(PendingRequestTracker::new()),
                handlers: Mutex::new(HandlerRegistry::new()),
                disposed: AtomicBool::new(false),
                dispose_listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Name used in log records.
    #[must_use]
    pub fn label(&self) -> &str {
        self.inner.label.as_str()
    }

    /// Configuration the bus was created with.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// Sends a request and waits for its return.
    ///
    /// Uses the configured default deadline, if any.
    ///
    /// # Errors
    ///
    /// See [`EnvelopeBus::request_with`].
    pub async fn request(
        &self,
        kind: RequestKind,
        payload: Option<Value>,
    ) -> Result<Option<Value>, BusError> {
        self.request_with(kind, payload, RequestOptions::default()).await
    }

    /// Sends a request with per-call options and waits for its return.
    ///
    /// Dropping the returned future withdraws the request; a return that
    /// arrives afterwards is discarded as stale. Deadlines rely on the tokio
    /// timer, so a request with a deadline must be awaited inside a tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// - [`BusError::BusDisposed`] when the bus is or becomes disposed.
    /// - [`BusError::Transport`] when the envelope cannot be sent.
    /// - [`BusError::RequestTimeout`] when the deadline elapses first.
    /// - [`BusError::HandlerError`] or [`BusError::UnhandledRequest`] when
    ///   the remote side answers with an error marker.
    pub async fn request_with(
        &self,
        kind: RequestKind,
        payload: Option<Value>,
        options: RequestOptions,
    ) -> Result<Option<Value>, BusError> {
        let (id, receiver) = {
            let mut pending = self.inner.pending.lock();
            // Checked under the lock so disposal cannot miss this entry.
            if self.is_disposed() {
                return Err(BusError::BusDisposed);
            }
            pending.register(kind)
        };
        let guard = PendingGuard {
            inner: &self.inner,
            id: id.clone(),
        };

        debug!(
            target: BUS_TARGET,
            bus = %self.inner.label,
            %kind,
            %id,
            "sending request"
        );
        self.inner.transport.send(Envelope::request(kind, id.clone(), payload).into_wire())?;

        let deadline = options.timeout.or_else(|| self.inner.config.request_timeout());
        let settled = match deadline {
            Some(limit) => match tokio::time::timeout(limit, receiver).await {
                Ok(settled) => settled,
                Err(_elapsed) => {
                    debug!(
                        target: BUS_TARGET,
                        bus = %self.inner.label,
                        %kind,
                        %id,
                        timeout_ms = limit.as_millis(),
                        "request timed out"
                    );
                    return Err(BusError::RequestTimeout {
                        kind,
                        id,
                        timeout: limit,
                    });
                }
            },
            None => receiver.await,
        };
        drop(guard);
        // A dropped resolver means the tracker was drained without an answer.
        settled.unwrap_or_else(|_canceled| Err(BusError::BusDisposed))
    }

    /// Sends a notification.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::BusDisposed`] after disposal and
    /// [`BusError::Transport`] when the envelope cannot be sent.
    pub fn notify(&self, kind: NotifyKind, payload: Option<Value>) -> Result<(), BusError> {
        self.ensure_live()?;
        debug!(
            target: BUS_TARGET,
            bus = %self.inner.label,
            %kind,
            "sending notification"
        );
        self.inner.transport.send(Envelope::notify(kind, payload).into_wire())?;
        Ok(())
    }

    /// Installs the handler answering requests of `kind`.
    ///
    /// Returns `true` when a previous handler was replaced. Registration on
    /// a disposed bus is ignored and returns `false`.
    pub fn register_request_handler<F, Fut>(&self, kind: RequestKind, handler: F) -> bool
    where
        F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, HandlerFailure>> + Send + 'static,
    {
        let boxed: RequestHandler = Arc::new(move |data| handler(data).boxed());
        let mut handlers = self.inner.handlers.lock();
        if self.is_disposed() {
            return false;
        }
        let replaced = handlers.set_request_handler(kind, boxed).is_some();
        if replaced {
            warn!(
                target: BUS_TARGET,
                bus = %self.inner.label,
                %kind,
                "replaced request handler"
            );
        }
        replaced
    }

    /// Removes the handler for `kind`, returning whether one was installed.
    pub fn deregister_request_handler(&self, kind: RequestKind) -> bool {
        self.inner.handlers.lock().remove_request_handler(kind)
    }

    /// Subscribes `handler` to notifications of `kind`.
    pub fn register_notify_handler<F>(&self, kind: NotifyKind, handler: F) -> RegistrationId
    where
        F: Fn(Option<&Value>) -> Result<(), HandlerFailure> + Send + Sync + 'static,
    {
        let boxed: NotifyHandler = Arc::new(handler);
        let mut handlers = self.inner.handlers.lock();
        let id = handlers.add_notify_handler(kind, boxed);
        if self.is_disposed() {
            handlers.remove_notify_handler(id);
        }
        id
    }

    /// Removes a subscription, returning whether it was still registered.
    pub fn deregister(&self, id: RegistrationId) -> bool {
        self.inner.handlers.lock().remove_notify_handler(id)
    }

    /// Shuts the bus down.
    ///
    /// Rejects every outstanding request with [`BusError::BusDisposed`],
    /// drops all handlers, and makes later sends fail. Returns how many
    /// requests were rejected; a second call does nothing and returns 0.
    pub fn dispose(&self) -> usize {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return 0;
        }
        let rejected = self.inner.pending.lock().reject_all(&BusError::BusDisposed);
        self.inner.handlers.lock().clear();
        for listener in self.inner.dispose_listeners.lock().drain(..) {
            let _notified = listener.send(()).is_ok();
        }
        info!(
            target: BUS_TARGET,
            bus = %self.inner.label,
            rejected,
            "envelope bus disposed"
        );
        rejected
    }

    /// Whether [`EnvelopeBus::dispose`] has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Completes once the bus is disposed.
    pub fn disposed(&self) -> impl Future<Output = ()> + Send + 'static {
        let (listener, signal) = oneshot::channel();
        {
            let mut listeners = self.inner.dispose_listeners.lock();
            if self.is_disposed() {
                let _notified = listener.send(()).is_ok();
            } else {
                listeners.push(listener);
            }
        }
        signal.map(|_| ())
    }

    /// Number of requests waiting for a return.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Age of the longest-waiting request.
    #[must_use]
    pub fn oldest_pending_age(&self) -> Option<Duration> {
        self.inner.pending.lock().oldest_age()
    }

    fn ensure_live(&self) -> Result<(), BusError> {
        if self.is_disposed() {
            Err(BusError::BusDisposed)
        } else {
            Ok(())
        }
    }

    fn transmit(&self, envelope: Envelope) -> Result<(), BusError> {
        self.inner.transport.send(envelope.into_wire())?;
        Ok(())
    }
}

/// Withdraws a pending entry when its requester stops waiting.
struct PendingGuard<'bus> {
    inner: &'bus BusInner,
    id: CorrelationId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.inner.pending.lock().remove(&self.id) {
            debug!(
                target: BUS_TARGET,
                bus = %self.inner.label,
                id = %self.id,
                "withdrew pending request"
            );
        }
    }
}
