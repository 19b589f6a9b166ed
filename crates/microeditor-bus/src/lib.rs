//! Envelope bus connecting a host page to an embedded editor.
//!
//! Both sides run an [`EnvelopeBus`] over a [`Transport`]. Requests are
//! correlated with their returns by the [`PendingRequestTracker`],
//! incoming messages are routed through the [`HandlerRegistry`], and the
//! [`EditorEnvelope`] and [`HostController`] facades name the messages
//! each role exchanges.
//!
//! ```
//! use futures::executor::block_on;
//! use microeditor_bus::{EnvelopeBus, memory};
//! use microeditor_config::BusConfig;
//! use microeditor_protocol::RequestKind;
//! use serde_json::json;
//!
//! let (host_end, editor_end) = memory::duplex();
//! let host = EnvelopeBus::new("host", host_end.transport, BusConfig::default());
//! let editor = EnvelopeBus::new("editor", editor_end.transport, BusConfig::default());
//! host.register_request_handler(RequestKind::Content, |_| async {
//!     Ok(Some(json!({"content": "abc"})))
//! });
//!
//! let answer = block_on(async {
//!     let serve_host = host.serve(host_end.incoming);
//!     let serve_editor = editor.serve(editor_end.incoming);
//!     let ask = async {
//!         let answer = editor.request(RequestKind::Content, None).await;
//!         host.dispose();
//!         editor.dispose();
//!         answer
//!     };
//!     let (answer, (), ()) = futures::join!(ask, serve_host, serve_editor);
//!     answer
//! });
//! assert_eq!(answer.expect("host answers"), Some(json!({"content": "abc"})));
//! ```

mod bus;
mod error;
mod registry;
mod roles;
mod tracker;
pub mod transport;

#[cfg(test)]
mod tests;

pub use self::bus::{DispatchOutcome, EnvelopeBus, RequestOptions};
pub use self::error::{BusError, HandlerFailure, TransportError};
pub use self::registry::{
    HandlerRegistry, NotifyHandler, RegistrationId, RequestFuture, RequestHandler,
};
pub use self::roles::{EditorEnvelope, HostController, InitPolling};
pub use self::tracker::{PendingReceiver, PendingRequestTracker, PendingResult, ResolveOutcome};
pub use self::transport::{Transport, memory};
