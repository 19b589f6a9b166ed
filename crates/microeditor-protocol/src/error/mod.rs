//! Errors raised while decoding envelopes from the wire.
//!
//! Every variant describes a malformed envelope. Receivers drop such input
//! and keep processing; nothing here is fatal to a bus.

use std::sync::Arc;

use thiserror::Error;

use crate::kind::MessageKind;

/// Structural problems found in a received envelope.
#[derive(Debug, Clone, Error)]
pub enum EnvelopeError {
    /// The wire value was not a JSON object.
    #[error("malformed envelope: expected an object, found {found}")]
    NotAnObject {
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// The `type` field was absent.
    #[error("malformed envelope: missing `type` field")]
    MissingType,

    /// The `type` field was not a non-negative integer.
    #[error("malformed envelope: `type` must be a non-negative integer")]
    InvalidType,

    /// The `type` field named no registered kind.
    #[error("malformed envelope: unknown message type tag {tag}")]
    UnknownType {
        /// Tag found on the wire.
        tag: u64,
    },

    /// A request or return arrived without a correlation id.
    #[error("malformed envelope: {kind} requires a `messageId`")]
    MissingMessageId {
        /// Kind of the offending envelope.
        kind: MessageKind,
    },

    /// The `messageId` field was neither a string nor an integer.
    #[error("malformed envelope: `messageId` must be a string or an integer")]
    InvalidMessageId,

    /// The text frame was not valid JSON.
    #[error("malformed envelope: invalid JSON: {source}")]
    Json {
        /// Underlying parser error.
        #[source]
        source: Arc<serde_json::Error>,
    },
}

impl EnvelopeError {
    /// Short machine-friendly label, used as a structured log field.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NotAnObject { .. } => "not_an_object",
            Self::MissingType => "missing_type",
            Self::InvalidType => "invalid_type",
            Self::UnknownType { .. } => "unknown_type",
            Self::MissingMessageId { .. } => "missing_message_id",
            Self::InvalidMessageId => "invalid_message_id",
            Self::Json { .. } => "invalid_json",
        }
    }
}

impl From<serde_json::Error> for EnvelopeError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            source: Arc::new(source),
        }
    }
}
