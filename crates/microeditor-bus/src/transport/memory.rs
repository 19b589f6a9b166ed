//! In-process transport pairing two buses over unbounded channels.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use serde_json::Value;

use super::Transport;
use crate::error::TransportError;

/// Sending half of an in-memory link.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: UnboundedSender<Value>,
}

impl ChannelTransport {
    /// Whether the receiving side has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Stops delivery; later sends fail with [`TransportError::Closed`].
    pub fn close(&self) {
        self.sender.close_channel();
    }
}

impl Transport for ChannelTransport {
    fn send(&self, value: Value) -> Result<(), TransportError> {
        self.sender.unbounded_send(value).map_err(|_| TransportError::Closed)
    }
}

/// One side of a [`duplex`] link.
#[derive(Debug)]
pub struct Endpoint {
    /// Sends to the opposite endpoint.
    pub transport: ChannelTransport,
    /// Values sent by the opposite endpoint.
    pub incoming: UnboundedReceiver<Value>,
}

impl Endpoint {
    /// Splits the endpoint into its halves.
    #[must_use]
    pub fn into_parts(self) -> (ChannelTransport, UnboundedReceiver<Value>) {
        (self.transport, self.incoming)
    }
}

/// Creates two connected endpoints.
///
/// Whatever one endpoint's transport sends arrives, in order, on the other
/// endpoint's `incoming` stream.
#[must_use]
pub fn duplex() -> (Endpoint, Endpoint) {
    let (left_tx, left_rx) = mpsc::unbounded();
    let (right_tx, right_rx) = mpsc::unbounded();
    (
        Endpoint {
            transport: ChannelTransport { sender: right_tx },
            incoming: left_rx,
        },
        Endpoint {
            transport: ChannelTransport { sender: left_tx },
            incoming: right_rx,
        },
    )
}
