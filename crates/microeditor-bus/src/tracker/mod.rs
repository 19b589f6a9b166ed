//! Outstanding-request bookkeeping.
//!
//! Every request a bus sends is registered here under a fresh correlation
//! id. The matching return, a timeout, caller cancellation, or disposal
//! removes the entry; whichever comes first wins and the others find
//! nothing to do.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures::channel::oneshot;
use microeditor_protocol::{CorrelationId, RequestKind, ReturnPayload};
use serde_json::Value;

use crate::error::BusError;

/// Result delivered to a waiting requester.
pub type PendingResult = Result<Option<Value>, BusError>;

/// Receiving half handed to the requester.
pub type PendingReceiver = oneshot::Receiver<PendingResult>;

/// What happened to a received return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The waiting request was completed.
    Resolved {
        /// Kind of the completed request.
        kind: RequestKind,
        /// Time between registration and resolution.
        elapsed: Duration,
    },
    /// No request is waiting under that id.
    Stale,
    /// A request is waiting under that id but for a different kind; it is
    /// left in place.
    KindMismatch {
        /// Kind the waiting request was issued for.
        expected: RequestKind,
    },
}

#[derive(Debug)]
struct PendingRequest {
    kind: RequestKind,
    resolver: oneshot::Sender<PendingResult>,
    registered_at: Instant,
}

/// Map of correlation ids to waiting requesters.
///
/// Ids come from a per-tracker counter and are never reused while the
/// tracker lives.
#[derive(Debug, Default)]
pub struct PendingRequestTracker {
    next_id: u64,
    entries: HashMap<CorrelationId, PendingRequest>,
}

impl PendingRequestTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new outstanding request of `kind`.
    ///
    /// Returns the id to send on the wire and the receiver that completes
    /// when the request is resolved or rejected.
    pub fn register(&mut self, kind: RequestKind) -> (CorrelationId, PendingReceiver) {
        let id = loop {
            self.next_id = self.next_id.wrapping_add(1);
            let candidate = CorrelationId::from(self.next_id);
            if !self.entries.contains_key(&candidate) {
                break candidate;
            }
        };
        let (resolver, receiver) = oneshot::channel();
        self.entries.insert(
            id.clone(),
            PendingRequest {
                kind,
                resolver,
                registered_at: Instant::now(),
            },
        );
        (id, receiver)
    }

    /// Completes the request waiting under `id` with a return of `answered`.
    ///
    /// Error markers in `payload` reject the request with the matching
    /// [`BusError`]. A return whose kind does not pair with the waiting
    /// request leaves the entry untouched.
    pub fn resolve(
        &mut self,
        id: &CorrelationId,
        answered: RequestKind,
        payload: ReturnPayload,
    ) -> ResolveOutcome {
        let Some(entry) = self.entries.get(id) else {
            return ResolveOutcome::Stale;
        };
        if entry.kind != answered {
            return ResolveOutcome::KindMismatch {
                expected: entry.kind,
            };
        }
        let Some(pending) = self.entries.remove(id) else {
            return ResolveOutcome::Stale;
        };
        let result = match payload {
            ReturnPayload::Value(data) => Ok(data),
            ReturnPayload::Error(error) => Err(BusError::from_return_error(pending.kind, &error)),
        };
        let elapsed = pending.registered_at.elapsed();
        // The requester may have stopped waiting; the entry is gone either way.
        let _delivered = pending.resolver.send(result).is_ok();
        ResolveOutcome::Resolved {
            kind: pending.kind,
            elapsed,
        }
    }

    /// Rejects the request waiting under `id`.
    ///
    /// Returns `false` when nothing was waiting.
    pub fn reject(&mut self, id: &CorrelationId, error: BusError) -> bool {
        self.entries.remove(id).is_some_and(|pending| {
            let _delivered = pending.resolver.send(Err(error)).is_ok();
            true
        })
    }

    /// Forgets the request waiting under `id` without completing it.
    pub fn remove(&mut self, id: &CorrelationId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Rejects every waiting request with a clone of `error`.
    ///
    /// Returns how many requests were rejected.
    pub fn reject_all(&mut self, error: &BusError) -> usize {
        let drained: Vec<PendingRequest> = self.entries.drain().map(|(_, entry)| entry).collect();
        let count = drained.len();
        for pending in drained {
            let _delivered = pending.resolver.send(Err(error.clone())).is_ok();
        }
        count
    }

    /// Number of waiting requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a request is waiting under `id`.
    #[must_use]
    pub fn contains(&self, id: &CorrelationId) -> bool {
        self.entries.contains_key(id)
    }

    /// Kind of the request waiting under `id`.
    #[must_use]
    pub fn kind_of(&self, id: &CorrelationId) -> Option<RequestKind> {
        self.entries.get(id).map(|entry| entry.kind)
    }

    /// Age of the longest-waiting request.
    #[must_use]
    pub fn oldest_age(&self) -> Option<Duration> {
        self.entries
            .values()
            .map(|entry| entry.registered_at.elapsed())
            .max()
    }
}
