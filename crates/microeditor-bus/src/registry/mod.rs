//! Handlers registered on a bus, keyed by message kind.
//!
//! A request kind has at most one handler, since exactly one return may be
//! sent per request. A notify kind fans out to every subscriber in
//! registration order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use microeditor_protocol::{NotifyKind, RequestKind};
use serde_json::Value;

use crate::error::HandlerFailure;

/// Future produced by a request handler.
pub type RequestFuture = BoxFuture<'static, Result<Option<Value>, HandlerFailure>>;

/// Answers requests of one kind with the payload for the return.
pub type RequestHandler = Arc<dyn Fn(Option<Value>) -> RequestFuture + Send + Sync>;

/// Receives notifications of one kind.
pub type NotifyHandler = Arc<dyn Fn(Option<&Value>) -> Result<(), HandlerFailure> + Send + Sync>;

/// Token identifying one notify subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId {
    kind: NotifyKind,
    sequence: u64,
}

impl RegistrationId {
    /// Notify kind the subscription listens to.
    #[must_use]
    pub const fn kind(self) -> NotifyKind {
        self.kind
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.sequence)
    }
}

struct NotifyEntry {
    id: RegistrationId,
    handler: NotifyHandler,
}

/// Request and notify handlers of one bus.
#[derive(Default)]
pub struct HandlerRegistry {
    requests: HashMap<RequestKind, RequestHandler>,
    notifications: HashMap<NotifyKind, Vec<NotifyEntry>>,
    next_sequence: u64,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut request_kinds: Vec<&RequestKind> = self.requests.keys().collect();
        request_kinds.sort_by_key(|kind| kind.request_kind().tag());
        f.debug_struct("HandlerRegistry")
            .field("requests", &request_kinds)
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the handler for `kind`, returning the one it replaced.
    pub fn set_request_handler(
        &mut self,
        kind: RequestKind,
        handler: RequestHandler,
    ) -> Option<RequestHandler> {
        self.requests.insert(kind, handler)
    }

    /// Removes the handler for `kind`.
    pub fn remove_request_handler(&mut self, kind: RequestKind) -> bool {
        self.requests.remove(&kind).is_some()
    }

    /// Handler for `kind`, if any.
    #[must_use]
    pub fn request_handler(&self, kind: RequestKind) -> Option<RequestHandler> {
        self.requests.get(&kind).cloned()
    }

    /// Appends a subscriber for `kind`.
    pub fn add_notify_handler(
        &mut self,
        kind: NotifyKind,
        handler: NotifyHandler,
    ) -> RegistrationId {
        self.next_sequence = self.next_sequence.wrapping_add(1);
        let id = RegistrationId {
            kind,
            sequence: self.next_sequence,
        };
        self.notifications
            .entry(kind)
            .or_default()
            .push(NotifyEntry { id, handler });
        id
    }

    /// Removes one subscription. Returns `false` when it was already gone.
    pub fn remove_notify_handler(&mut self, id: RegistrationId) -> bool {
        let Some(entries) = self.notifications.get_mut(&id.kind) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.notifications.remove(&id.kind);
        }
        removed
    }

    /// Subscribers for `kind` in registration order.
    #[must_use]
    pub fn notify_handlers(&self, kind: NotifyKind) -> Vec<NotifyHandler> {
        self.notifications
            .get(&kind)
            .map(|entries| entries.iter().map(|entry| Arc::clone(&entry.handler)).collect())
            .unwrap_or_default()
    }

    /// Whether a handler is installed for `kind`.
    #[must_use]
    pub fn has_request_handler(&self, kind: RequestKind) -> bool {
        self.requests.contains_key(&kind)
    }

    /// Total number of notify subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.notifications.values().map(Vec::len).sum()
    }

    /// Drops every handler.
    pub fn clear(&mut self) {
        self.requests.clear();
        self.notifications.clear();
    }
}
