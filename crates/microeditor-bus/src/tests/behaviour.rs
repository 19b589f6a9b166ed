//! Behaviour-driven tests for request/return and notification flows.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::mpsc::UnboundedReceiver;
use futures::executor::block_on;
use futures::future::BoxFuture;
use futures::task::noop_waker_ref;
use microeditor_config::BusConfig;
use microeditor_protocol::{NotifyKind, RequestKind};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use crate::bus::EnvelopeBus;
use crate::error::{BusError, HandlerFailure};
use crate::tests::support::error_label;
use crate::transport::memory;

type RequestOutcome = Result<Option<Value>, BusError>;

struct TestWorld {
    host: EnvelopeBus,
    editor: EnvelopeBus,
    host_incoming: UnboundedReceiver<Value>,
    editor_incoming: UnboundedReceiver<Value>,
    in_flight: Option<BoxFuture<'static, RequestOutcome>>,
    outcome: Option<RequestOutcome>,
    undo_calls: Arc<AtomicUsize>,
}

#[fixture]
fn world() -> TestWorld {
    let (host_end, editor_end) = memory::duplex();
    let (host_transport, host_incoming) = host_end.into_parts();
    let (editor_transport, editor_incoming) = editor_end.into_parts();
    TestWorld {
        host: EnvelopeBus::new("host", host_transport, BusConfig::default()),
        editor: EnvelopeBus::new("editor", editor_transport, BusConfig::default()),
        host_incoming,
        editor_incoming,
        in_flight: None,
        outcome: None,
        undo_calls: Arc::new(AtomicUsize::new(0)),
    }
}

/// Dispatches everything already delivered to either side.
fn pump(world: &mut TestWorld) {
    while let Ok(Some(raw)) = world.host_incoming.try_next() {
        let _outcome = block_on(world.host.dispatch(raw));
    }
    while let Ok(Some(raw)) = world.editor_incoming.try_next() {
        let _outcome = block_on(world.editor.dispatch(raw));
    }
}

/// Polls the in-flight request, pumping both sides between polls.
fn drive(world: &mut TestWorld) {
    let mut request = world.in_flight.take().expect("no request in flight");
    let mut cx = Context::from_waker(noop_waker_ref());
    for _ in 0..16 {
        if let Poll::Ready(outcome) = request.as_mut().poll(&mut cx) {
            world.outcome = Some(outcome);
            return;
        }
        pump(world);
    }
    panic!("request never settled");
}

fn start_content_request(world: &mut TestWorld) {
    let editor = world.editor.clone();
    let mut request = async move { editor.request(RequestKind::Content, None).await }.boxed();
    let mut cx = Context::from_waker(noop_waker_ref());
    assert!(request.as_mut().poll(&mut cx).is_pending());
    world.in_flight = Some(request);
}

fn failure(world: &TestWorld) -> &BusError {
    world
        .outcome
        .as_ref()
        .expect("no request outcome")
        .as_ref()
        .expect_err("expected the request to fail")
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a linked host and editor")]
fn given_linked(world: &mut TestWorld) {
    assert!(!world.host.is_disposed());
    assert!(!world.editor.is_disposed());
}

#[given("the host answers content requests with {content}")]
fn given_host_answers(world: &mut TestWorld, content: String) {
    let text = content.trim_matches('"').to_owned();
    world
        .host
        .register_request_handler(RequestKind::Content, move |_| {
            let answer = json!({"content": text.clone()});
            async move { Ok(Some(answer)) }
        });
}

#[given("the host fails content requests with {message}")]
fn given_host_fails(world: &mut TestWorld, message: String) {
    let text = message.trim_matches('"').to_owned();
    world
        .host
        .register_request_handler(RequestKind::Content, move |_| {
            let failure = HandlerFailure::new(text.clone());
            async move { Err(failure) }
        });
}

#[given("the editor has {count} undo listeners")]
fn given_undo_listeners(world: &mut TestWorld, count: usize) {
    for _ in 0..count {
        let calls = Arc::clone(&world.undo_calls);
        world
            .editor
            .register_notify_handler(NotifyKind::EditorUndo, move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
    }
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the editor requests content")]
fn when_editor_requests_content(world: &mut TestWorld) {
    start_content_request(world);
    drive(world);
}

#[when("the editor starts a content request")]
fn when_editor_starts_request(world: &mut TestWorld) {
    start_content_request(world);
    assert_eq!(world.editor.pending_requests(), 1);
}

#[when("the editor bus is disposed")]
fn when_editor_disposed(world: &mut TestWorld) {
    assert_eq!(world.editor.dispose(), 1);
    drive(world);
}

#[when("the host sends an undo")]
fn when_host_sends_undo(world: &mut TestWorld) {
    world
        .host
        .notify(NotifyKind::EditorUndo, None)
        .expect("notify");
    pump(world);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the editor receives content {content}")]
fn then_editor_receives(world: &mut TestWorld, content: String) {
    let payload = world
        .outcome
        .as_ref()
        .expect("no request outcome")
        .as_ref()
        .expect("request failed");
    assert_eq!(
        payload.as_ref().and_then(|value| value.get("content")),
        Some(&json!(content.trim_matches('"')))
    );
}

#[then("no requests are pending on the editor")]
fn then_nothing_pending(world: &mut TestWorld) {
    assert_eq!(world.editor.pending_requests(), 0);
}

#[then("the request fails with {label}")]
fn then_request_fails(world: &mut TestWorld, label: String) {
    assert_eq!(error_label(failure(world)), label.trim_matches('"'));
}

#[then("the failure mentions {text}")]
fn then_failure_mentions(world: &mut TestWorld, text: String) {
    let message = failure(world).to_string();
    assert!(
        message.contains(text.trim_matches('"')),
        "unexpected failure: {message}"
    );
}

#[then("{count} undo listeners were notified")]
fn then_listeners_notified(world: &mut TestWorld, count: usize) {
    assert_eq!(world.undo_calls.load(Ordering::SeqCst), count);
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/envelope_bus.feature",
    name = "Host answers the editor's content request"
)]
fn host_answers_content_request(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/envelope_bus.feature",
    name = "Request without a registered handler"
)]
fn request_without_handler(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/envelope_bus.feature",
    name = "Failing handler"
)]
fn failing_handler(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/envelope_bus.feature",
    name = "Notifications fan out to every listener"
)]
fn notifications_fan_out(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/envelope_bus.feature",
    name = "Disposing rejects outstanding requests"
)]
fn disposing_rejects_outstanding_requests(world: TestWorld) {
    let _ = world;
}
