//! Error marker carried in the payload of a failed return.
//!
//! A request that could not be answered still gets exactly one return. Its
//! `data` is the single-key object below instead of the expected payload:
//!
//! ```text
//! { "envelopeError": { "kind": "handler_error", "message": "..." } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::Display;

use crate::kind::RequestKind;

const MARKER_FIELD: &str = "envelopeError";

/// Why the remote side could not answer a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReturnErrorKind {
    /// The registered handler failed.
    HandlerError,
    /// No handler was registered for the request kind.
    UnhandledRequest,
}

/// Error description sent back in place of a return payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnError {
    kind: ReturnErrorKind,
    message: String,
}

impl ReturnError {
    /// Marks a failure raised by the request handler.
    #[must_use]
    pub fn handler_error(message: impl Into<String>) -> Self {
        Self {
            kind: ReturnErrorKind::HandlerError,
            message: message.into(),
        }
    }

    /// Marks a request that no handler was registered for.
    #[must_use]
    pub fn unhandled(kind: RequestKind) -> Self {
        Self {
            kind: ReturnErrorKind::UnhandledRequest,
            message: format!("no handler registered for {kind}"),
        }
    }

    /// Category of the failure.
    #[must_use]
    pub const fn kind(&self) -> ReturnErrorKind {
        self.kind
    }

    /// Human-readable description.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Encodes the marker as a return payload.
    #[must_use]
    pub fn into_data(self) -> Value {
        json!({ MARKER_FIELD: self })
    }
}

/// Interpretation of a received return payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnPayload {
    /// The requested value, absent for unit returns.
    Value(Option<Value>),
    /// The remote side failed to answer.
    Error(ReturnError),
}

impl ReturnPayload {
    /// Classifies a return's `data`.
    ///
    /// Only an object whose single key is the marker field, holding a valid
    /// marker, is treated as an error. Anything else is a value.
    #[must_use]
    pub fn from_data(data: Option<Value>) -> Self {
        match data {
            Some(Value::Object(object)) => match marker_in(&object) {
                Some(error) => Self::Error(error),
                None => Self::Value(Some(Value::Object(object))),
            },
            other => Self::Value(other),
        }
    }
}

fn marker_in(object: &Map<String, Value>) -> Option<ReturnError> {
    if object.len() != 1 {
        return None;
    }
    let marker = object.get(MARKER_FIELD)?;
    serde_json::from_value(marker.clone()).ok()
}
