//! Outbound seam between the bus and whatever carries envelopes.
//!
//! A transport only sends. Inbound traffic is fed to the bus by the
//! embedder, either one value at a time through
//! [`EnvelopeBus::dispatch`](crate::EnvelopeBus::dispatch) or as a stream
//! through [`EnvelopeBus::serve`](crate::EnvelopeBus::serve).

pub mod memory;

use std::sync::Arc;

use serde_json::Value;

use crate::error::TransportError;

/// Carries encoded envelopes to the other side.
///
/// Values are handed over by move; the receiving side must never observe
/// later mutation by the sender.
pub trait Transport: Send + Sync {
    /// Sends one encoded envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the value cannot be delivered.
    fn send(&self, value: Value) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, value: Value) -> Result<(), TransportError> {
        (**self).send(value)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, value: Value) -> Result<(), TransportError> {
        (**self).send(value)
    }
}
