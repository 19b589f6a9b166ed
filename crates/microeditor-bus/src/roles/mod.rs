//! Role-specific views of an [`EnvelopeBus`](crate::EnvelopeBus).
//!
//! The bus is symmetric; these facades only name the messages each side of
//! the embedding is expected to send, answer, and listen to.

mod editor;
mod host;

pub use editor::EditorEnvelope;
pub use host::{HostController, InitPolling};

#[cfg(test)]
mod tests;
