//! Transports and helpers used by the bus tests.

use std::sync::Arc;

use microeditor_protocol::{Envelope, MessageFamily};
use mockall::mock;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::TransportError;
use crate::transport::Transport;

mock! {
    pub Wire {}

    impl Transport for Wire {
        fn send(&self, value: Value) -> Result<(), TransportError>;
    }
}

/// Transport that keeps everything it is asked to send.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingTransport {
    sent: Arc<Mutex<Vec<Value>>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sent(&self) -> Vec<Value> {
        self.sent.lock().clone()
    }

    pub(crate) fn take(&self) -> Vec<Value> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.sent.lock().len()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, value: Value) -> Result<(), TransportError> {
        self.sent.lock().push(value);
        Ok(())
    }
}

/// Builds the wire return answering `request` with `data`.
pub(crate) fn answer(request: &Value, data: Option<Value>) -> Value {
    let envelope = Envelope::from_wire(request).expect("recorded request is well formed");
    let MessageFamily::Request(kind) = envelope.family() else {
        panic!("expected a request, got {}", envelope.kind());
    };
    let id = envelope.id().cloned().expect("requests carry an id");
    Envelope::return_for(kind, id, data).into_wire()
}

/// Stable label for asserting on error categories.
pub(crate) fn error_label(error: &crate::error::BusError) -> &'static str {
    use crate::error::BusError;
    match error {
        BusError::MalformedEnvelope(_) => "malformed_envelope",
        BusError::RequestTimeout { .. } => "request_timeout",
        BusError::BusDisposed => "bus_disposed",
        BusError::UnhandledRequest { .. } => "unhandled_request",
        BusError::HandlerError { .. } => "handler_error",
        BusError::Transport(_) => "transport",
        BusError::Payload { .. } => "payload",
        BusError::InitPollingExhausted { .. } => "init_polling_exhausted",
    }
}
