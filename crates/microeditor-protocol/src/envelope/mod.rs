//! Wire-level envelope and its JSON codec.
//!
//! An envelope is the single unit the transport carries:
//!
//! ```text
//! { "type": <integer tag>, "messageId"?: <string>, "data"?: <payload> }
//! ```
//!
//! Requests and returns always carry a `messageId`; notifications never
//! need one. Payloads are plain JSON values, so nothing that cannot be
//! structurally copied ever reaches the codec.

mod marker;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::EnvelopeError;
use crate::kind::{MessageFamily, MessageKind, NotifyKind, RequestKind};

pub use marker::{ReturnError, ReturnErrorKind, ReturnPayload};

const TYPE_FIELD: &str = "type";
const MESSAGE_ID_FIELD: &str = "messageId";
const DATA_FIELD: &str = "data";

/// Identifier pairing a request with its return.
///
/// Ids are written as strings. Integer ids from the wire are accepted and
/// normalised to their decimal form, so `1` and `"1"` name the same
/// exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Wraps an id string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the id text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn from_wire(value: &Value) -> Result<Self, EnvelopeError> {
        match value {
            Value::String(text) => Ok(Self(text.clone())),
            Value::Number(number) if number.is_u64() || number.is_i64() => {
                Ok(Self(number.to_string()))
            }
            _ => Err(EnvelopeError::InvalidMessageId),
        }
    }
}

impl From<u64> for CorrelationId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl Serialize for CorrelationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CorrelationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_wire(&value).map_err(serde::de::Error::custom)
    }
}

/// A single message travelling across the bus boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    kind: MessageKind,
    id: Option<CorrelationId>,
    data: Option<Value>,
}

impl Envelope {
    /// Builds the envelope opening a request/return exchange.
    #[must_use]
    pub fn request(kind: RequestKind, id: CorrelationId, data: Option<Value>) -> Self {
        Self {
            kind: kind.request_kind(),
            id: Some(id),
            data: non_null(data),
        }
    }

    /// Builds the return answering a request of `kind`.
    ///
    /// The wire kind is derived from the request kind, so a return can only
    /// ever answer the exchange it belongs to.
    #[must_use]
    pub fn return_for(kind: RequestKind, id: CorrelationId, data: Option<Value>) -> Self {
        Self {
            kind: kind.return_kind(),
            id: Some(id),
            data: non_null(data),
        }
    }

    /// Builds a fire-and-forget notification.
    #[must_use]
    pub fn notify(kind: NotifyKind, data: Option<Value>) -> Self {
        Self {
            kind: kind.message_kind(),
            id: None,
            data: non_null(data),
        }
    }

    /// Wire kind of the envelope.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Family of the envelope's kind.
    #[must_use]
    pub const fn family(&self) -> MessageFamily {
        self.kind.family()
    }

    /// Correlation id, present on requests and returns.
    #[must_use]
    pub const fn id(&self) -> Option<&CorrelationId> {
        self.id.as_ref()
    }

    /// Payload, absent when the message carries none.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Splits the envelope into its kind, id and payload.
    #[must_use]
    pub fn into_parts(self) -> (MessageKind, Option<CorrelationId>, Option<Value>) {
        (self.kind, self.id, self.data)
    }

    /// Encodes the envelope as its wire object.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        self.clone().into_wire()
    }

    /// Encodes the envelope as its wire object, consuming it.
    #[must_use]
    pub fn into_wire(self) -> Value {
        let mut object = Map::new();
        object.insert(TYPE_FIELD.to_owned(), Value::from(self.kind.tag()));
        if let Some(id) = self.id {
            object.insert(MESSAGE_ID_FIELD.to_owned(), Value::String(id.0));
        }
        if let Some(data) = self.data {
            object.insert(DATA_FIELD.to_owned(), data);
        }
        Value::Object(object)
    }

    /// Decodes an envelope from its wire object.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvelopeError`] when the value is not an object, the
    /// `type` is missing, not an integer or unknown, the `messageId` has the
    /// wrong shape, or a request/return lacks its `messageId`. A
    /// notification that carries a `messageId` is accepted and the id is
    /// discarded.
    pub fn from_wire(value: &Value) -> Result<Self, EnvelopeError> {
        let Value::Object(object) = value else {
            return Err(EnvelopeError::NotAnObject {
                found: json_type_name(value),
            });
        };

        let tag = object
            .get(TYPE_FIELD)
            .ok_or(EnvelopeError::MissingType)?
            .as_u64()
            .ok_or(EnvelopeError::InvalidType)?;
        let kind =
            MessageKind::try_from(tag).map_err(|unknown| EnvelopeError::UnknownType {
                tag: unknown.tag,
            })?;

        let wire_id = match object.get(MESSAGE_ID_FIELD) {
            None | Some(Value::Null) => None,
            Some(raw) => Some(CorrelationId::from_wire(raw)?),
        };

        let id = if kind.is_correlated() {
            Some(wire_id.ok_or(EnvelopeError::MissingMessageId { kind })?)
        } else {
            None
        };

        Ok(Self {
            kind,
            id,
            data: non_null(object.get(DATA_FIELD).cloned()),
        })
    }

    /// Encodes the envelope as a JSON text frame.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_wire().to_string()
    }

    /// Decodes an envelope from a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Json`] for invalid JSON, otherwise the same
    /// errors as [`Envelope::from_wire`].
    pub fn from_json_str(text: &str) -> Result<Self, EnvelopeError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_wire(&value)
    }
}

fn non_null(data: Option<Value>) -> Option<Value> {
    data.filter(|value| !value.is_null())
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests;
