//! Envelope protocol shared by the host page and the embedded editor.
//!
//! The crate is the build-time contract both ends compile against: the
//! closed [`MessageKind`] registry, the [`Envelope`] wire unit with its JSON
//! codec, and a typed catalogue of message payloads. It has no runtime
//! state; the bus that moves envelopes lives in `microeditor-bus`.
//!
//! # Example
//!
//! ```
//! use microeditor_protocol::{CorrelationId, Envelope, MessageKind, RequestKind};
//! use serde_json::json;
//!
//! let wire = json!({"type": 5, "messageId": "1", "data": {"content": "abc"}});
//! let envelope = Envelope::from_wire(&wire).expect("well-formed envelope");
//! assert_eq!(envelope.kind(), MessageKind::ReturnContent);
//! assert_eq!(envelope.kind(), RequestKind::Content.return_kind());
//! assert_eq!(envelope.id(), Some(&CorrelationId::from(1)));
//! ```

pub mod envelope;
pub mod error;
pub mod kind;
pub mod messages;

#[cfg(test)]
mod tests;

pub use self::envelope::{CorrelationId, Envelope, ReturnError, ReturnErrorKind, ReturnPayload};
pub use self::error::EnvelopeError;
pub use self::kind::{MessageFamily, MessageKind, NotifyKind, RequestKind, UnknownMessageKind};
pub use self::messages::{NotifyMessage, RequestMessage, decode_payload, encode_payload};
