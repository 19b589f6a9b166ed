//! Error types surfaced by the envelope bus.
//!
//! [`BusError`] is `Clone` so a single cause, such as disposal, can be
//! delivered to every outstanding request at once.

use std::sync::Arc;
use std::time::Duration;

use microeditor_protocol::{
    CorrelationId, EnvelopeError, MessageKind, RequestKind, ReturnError, ReturnErrorKind,
};
use thiserror::Error;

/// Errors returned to callers of the bus.
#[derive(Debug, Clone, Error)]
pub enum BusError {
    /// Received data failed structural validation.
    #[error(transparent)]
    MalformedEnvelope(#[from] EnvelopeError),

    /// No return arrived before the request deadline.
    #[error("request {kind} ({id}) timed out after {}ms", .timeout.as_millis())]
    RequestTimeout {
        /// Kind of the request.
        kind: RequestKind,
        /// Correlation id of the request.
        id: CorrelationId,
        /// Deadline that elapsed.
        timeout: Duration,
    },

    /// The bus was disposed before or while the request was outstanding.
    #[error("envelope bus has been disposed")]
    BusDisposed,

    /// The remote side has no handler for the request kind.
    #[error("remote side has no handler for {kind}: {message}")]
    UnhandledRequest {
        /// Kind of the request.
        kind: RequestKind,
        /// Description sent by the remote side.
        message: String,
    },

    /// The remote handler failed while producing the return.
    #[error("remote handler for {kind} failed: {message}")]
    HandlerError {
        /// Kind of the request.
        kind: RequestKind,
        /// Description sent by the remote side.
        message: String,
    },

    /// The transport refused the outgoing envelope.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// A typed payload could not be converted to or from JSON.
    #[error("payload of {kind} could not be converted: {source}")]
    Payload {
        /// Wire kind whose payload failed.
        kind: MessageKind,
        /// Underlying serde error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// The editor never answered the initialisation handshake.
    #[error("editor did not answer initialisation after {attempts} attempts")]
    InitPollingExhausted {
        /// Attempts that were made.
        attempts: u32,
    },
}

impl BusError {
    /// Wraps a serde failure for the payload of `kind`.
    #[must_use]
    pub fn payload(kind: MessageKind, source: serde_json::Error) -> Self {
        Self::Payload {
            kind,
            source: Arc::new(source),
        }
    }

    /// Converts an error marker received in a return.
    #[must_use]
    pub fn from_return_error(kind: RequestKind, error: &ReturnError) -> Self {
        let message = error.message().to_owned();
        match error.kind() {
            ReturnErrorKind::HandlerError => Self::HandlerError { kind, message },
            ReturnErrorKind::UnhandledRequest => Self::UnhandledRequest { kind, message },
        }
    }
}

/// Failure reported by a registered handler.
///
/// Request handler failures travel back to the requester as an error
/// return; notify handler failures are logged and do not stop the remaining
/// handlers.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandlerFailure {
    message: String,
}

impl HandlerFailure {
    /// Builds a failure with the given description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable description.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl From<serde_json::Error> for HandlerFailure {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Errors raised by a [`Transport`](crate::Transport) while sending.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The other side is gone.
    #[error("transport channel is closed")]
    Closed,

    /// The transport refused the value.
    #[error("transport rejected the message: {message}")]
    Rejected {
        /// Reason given by the transport.
        message: String,
    },
}
