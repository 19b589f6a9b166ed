//! Routing of received envelopes.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures::{FutureExt, Stream, StreamExt};
use microeditor_config::UnhandledRequestPolicy;
use microeditor_protocol::{
    CorrelationId, Envelope, EnvelopeError, MessageFamily, NotifyKind, RequestKind, ReturnError,
    ReturnPayload,
};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::EnvelopeBus;
use crate::error::BusError;
use crate::tracker::ResolveOutcome;

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// What the bus did with one received value.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The bus was disposed; the value was ignored.
    Disposed,
    /// The value was not a valid envelope and was dropped.
    Malformed {
        /// Validation failure.
        error: EnvelopeError,
    },
    /// A request was answered with the handler's value.
    Answered {
        /// Request kind.
        kind: RequestKind,
    },
    /// A request handler failed; an error return was sent.
    HandlerFailed {
        /// Request kind.
        kind: RequestKind,
    },
    /// No handler was registered for a request.
    Unhandled {
        /// Request kind.
        kind: RequestKind,
        /// Whether an error return was sent.
        responded: bool,
    },
    /// The answer to a request could not be sent.
    ReturnNotSent {
        /// Request kind.
        kind: RequestKind,
        /// Transport failure.
        error: BusError,
    },
    /// A return completed an outstanding request.
    Resolved {
        /// Request kind.
        kind: RequestKind,
    },
    /// A return matched no outstanding request and was dropped.
    Stale {
        /// Request kind the return answers.
        kind: RequestKind,
    },
    /// A return's kind did not pair with the outstanding request; the
    /// request keeps waiting.
    KindMismatch {
        /// Kind of the outstanding request.
        expected: RequestKind,
        /// Kind the return answered.
        received: RequestKind,
    },
    /// A notification was delivered to its subscribers.
    Notified {
        /// Notify kind.
        kind: NotifyKind,
        /// Subscribers that returned successfully.
        delivered: usize,
        /// Subscribers that failed or panicked.
        failed: usize,
    },
}

impl EnvelopeBus {
    /// Validates a received value as an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::MalformedEnvelope`] when validation fails.
    pub fn decode(raw: &Value) -> Result<Envelope, BusError> {
        Envelope::from_wire(raw).map_err(BusError::from)
    }

    /// Processes one received value.
    ///
    /// Never fails: malformed input, stale returns, and handler failures are
    /// logged and reported through the returned [`DispatchOutcome`].
    pub async fn dispatch(&self, raw: Value) -> DispatchOutcome {
        if self.is_disposed() {
            debug!(
                target: DISPATCH_TARGET,
                bus = %self.inner.label,
                "ignoring envelope received after disposal"
            );
            return DispatchOutcome::Disposed;
        }
        let envelope = match Envelope::from_wire(&raw) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    bus = %self.inner.label,
                    reason = error.reason(),
                    %error,
                    "dropping malformed envelope"
                );
                return DispatchOutcome::Malformed { error };
            }
        };
        let (kind, id, data) = envelope.into_parts();
        match (kind.family(), id) {
            (MessageFamily::Notify(notify), _) => self.deliver_notification(notify, data.as_ref()),
            (MessageFamily::Request(request), Some(request_id)) => {
                self.answer_request(request, request_id, data).await
            }
            (MessageFamily::Return(request), Some(request_id)) => {
                self.resolve_return(request, &request_id, data)
            }
            (MessageFamily::Request(_) | MessageFamily::Return(_), None) => {
                DispatchOutcome::Malformed {
                    error: EnvelopeError::MissingMessageId { kind },
                }
            }
        }
    }

    /// Dispatches every value of `incoming` until it ends or the bus is
    /// disposed.
    ///
    /// Values are dispatched concurrently, so a request handler that itself
    /// issues a request can receive its return from the same stream.
    pub async fn serve<S>(&self, incoming: S)
    where
        S: Stream<Item = Value>,
    {
        incoming
            .take_until(self.disposed())
            .for_each_concurrent(None, |raw| async move {
                let _outcome = self.dispatch(raw).await;
            })
            .await;
        debug!(
            target: DISPATCH_TARGET,
            bus = %self.inner.label,
            "incoming stream finished"
        );
    }

    async fn answer_request(
        &self,
        kind: RequestKind,
        id: CorrelationId,
        data: Option<Value>,
    ) -> DispatchOutcome {
        let installed = self.inner.handlers.lock().request_handler(kind);
        let Some(handler) = installed else {
            return self.refuse_unhandled(kind, id);
        };

        debug!(
            target: DISPATCH_TARGET,
            bus = %self.inner.label,
            %kind,
            %id,
            "handling request"
        );
        let invocation = AssertUnwindSafe(async move { handler(data).await }).catch_unwind().await;
        let (payload, failed) = match invocation {
            Ok(Ok(value)) => (value, false),
            Ok(Err(failure)) => {
                warn!(
                    target: DISPATCH_TARGET,
                    bus = %self.inner.label,
                    %kind,
                    %id,
                    error = %failure,
                    "request handler failed"
                );
                (Some(ReturnError::handler_error(failure.message()).into_data()), true)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    target: DISPATCH_TARGET,
                    bus = %self.inner.label,
                    %kind,
                    %id,
                    panic = %message,
                    "request handler panicked"
                );
                (Some(ReturnError::handler_error(message).into_data()), true)
            }
        };

        if self.is_disposed() {
            return DispatchOutcome::Disposed;
        }
        match self.transmit(Envelope::return_for(kind, id, payload)) {
            Ok(()) if failed => DispatchOutcome::HandlerFailed { kind },
            Ok(()) => DispatchOutcome::Answered { kind },
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    bus = %self.inner.label,
                    %kind,
                    %error,
                    "failed to send return"
                );
                DispatchOutcome::ReturnNotSent { kind, error }
            }
        }
    }

    fn refuse_unhandled(&self, kind: RequestKind, id: CorrelationId) -> DispatchOutcome {
        match self.inner.config.unhandled_requests {
            UnhandledRequestPolicy::Drop => {
                warn!(
                    target: DISPATCH_TARGET,
                    bus = %self.inner.label,
                    %kind,
                    %id,
                    "no handler registered; dropping request"
                );
                DispatchOutcome::Unhandled {
                    kind,
                    responded: false,
                }
            }
            UnhandledRequestPolicy::RespondWithError => {
                warn!(
                    target: DISPATCH_TARGET,
                    bus = %self.inner.label,
                    %kind,
                    %id,
                    "no handler registered; answering with an error"
                );
                let marker = ReturnError::unhandled(kind).into_data();
                match self.transmit(Envelope::return_for(kind, id, Some(marker))) {
                    Ok(()) => DispatchOutcome::Unhandled {
                        kind,
                        responded: true,
                    },
                    Err(error) => DispatchOutcome::ReturnNotSent { kind, error },
                }
            }
        }
    }

    fn resolve_return(
        &self,
        kind: RequestKind,
        id: &CorrelationId,
        data: Option<Value>,
    ) -> DispatchOutcome {
        let outcome = self
            .inner
            .pending
            .lock()
            .resolve(id, kind, ReturnPayload::from_data(data));
        match outcome {
            ResolveOutcome::Resolved { elapsed, .. } => {
                debug!(
                    target: DISPATCH_TARGET,
                    bus = %self.inner.label,
                    %kind,
                    %id,
                    elapsed_ms = elapsed.as_millis(),
                    "request resolved"
                );
                DispatchOutcome::Resolved { kind }
            }
            ResolveOutcome::Stale => {
                debug!(
                    target: DISPATCH_TARGET,
                    bus = %self.inner.label,
                    %kind,
                    %id,
                    "dropping return with no pending request"
                );
                DispatchOutcome::Stale { kind }
            }
            ResolveOutcome::KindMismatch { expected } => {
                warn!(
                    target: DISPATCH_TARGET,
                    bus = %self.inner.label,
                    %kind,
                    %expected,
                    %id,
                    "return kind does not match pending request"
                );
                DispatchOutcome::KindMismatch {
                    expected,
                    received: kind,
                }
            }
        }
    }

    fn deliver_notification(&self, kind: NotifyKind, data: Option<&Value>) -> DispatchOutcome {
        let handlers = self.inner.handlers.lock().notify_handlers(kind);
        if handlers.is_empty() {
            debug!(
                target: DISPATCH_TARGET,
                bus = %self.inner.label,
                %kind,
                "no subscribers for notification"
            );
        }
        let mut delivered = 0_usize;
        let mut failed = 0_usize;
        for handler in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(data))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(failure)) => {
                    failed += 1;
                    warn!(
                        target: DISPATCH_TARGET,
                        bus = %self.inner.label,
                        %kind,
                        error = %failure,
                        "notification handler failed"
                    );
                }
                Err(panic) => {
                    failed += 1;
                    error!(
                        target: DISPATCH_TARGET,
                        bus = %self.inner.label,
                        %kind,
                        panic = %panic_message(panic.as_ref()),
                        "notification handler panicked"
                    );
                }
            }
        }
        DispatchOutcome::Notified {
            kind,
            delivered,
            failed,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("handler panicked"))
}
