//! Tests for the host and editor facades over a linked pair of buses.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use microeditor_config::{BusConfig, UnhandledRequestPolicy};
use microeditor_protocol::messages::{
    DirtyIndicator, EditorContent, InitParams, KeyboardEvent, KeyboardEventType, LanguageData,
    Rect, ResourceContent, ResourceContentParams, ResourcesList, StateControlCommand, Tutorial,
    UserInteraction,
};
use parking_lot::Mutex;
use rstest::rstest;

use super::*;
use crate::bus::EnvelopeBus;
use crate::error::BusError;
use crate::transport::memory;

struct Linked {
    host: HostController,
    editor: EditorEnvelope,
}

impl Drop for Linked {
    fn drop(&mut self) {
        self.host.dispose();
        self.editor.dispose();
    }
}

fn linked(editor_config: BusConfig) -> Linked {
    let (host_end, editor_end) = memory::duplex();
    let (host_transport, host_incoming) = host_end.into_parts();
    let (editor_transport, editor_incoming) = editor_end.into_parts();
    let host_bus = EnvelopeBus::new("host", host_transport, BusConfig::default());
    let editor_bus = EnvelopeBus::new("editor", editor_transport, editor_config);

    let serving_host = host_bus.clone();
    tokio::spawn(async move { serving_host.serve(host_incoming).await });
    let serving_editor = editor_bus.clone();
    tokio::spawn(async move { serving_editor.serve(editor_incoming).await });

    Linked {
        host: HostController::new(host_bus),
        editor: EditorEnvelope::new(editor_bus),
    }
}

fn init_params() -> InitParams {
    InitParams {
        origin: String::from("https://host.example"),
        bus_id: String::from("bus-1"),
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[rstest]
#[tokio::test]
async fn editor_fetches_language_and_content_from_host() {
    let pair = linked(BusConfig::default());
    pair.host.on_language_request(|| async {
        Ok(LanguageData {
            language: String::from("bpmn"),
            editor_id: None,
            resources: Vec::new(),
        })
    });
    pair.host.on_content_request(|| async { Ok(EditorContent::new("<definitions/>")) });

    let language = pair.editor.request_language().await.expect("language");
    let content = pair.editor.request_content().await.expect("content");

    assert_eq!(language.language, "bpmn");
    assert_eq!(content.content, "<definitions/>");
}

#[rstest]
#[tokio::test]
async fn editor_lists_and_reads_resources() {
    let pair = linked(BusConfig::default());
    pair.host.on_resource_list_request(|params| async move {
        Ok(ResourcesList {
            pattern: params.pattern,
            paths: vec![String::from("a.bpmn"), String::from("b.bpmn")],
        })
    });
    pair.host
        .on_resource_content_request(|params: ResourceContentParams| async move {
            Ok((params.path == "a.bpmn").then(|| ResourceContent {
                path: params.path.clone(),
                content: Some(String::from("<a/>")),
                content_type: params.opts.content_type,
            }))
        });

    let listing = pair
        .editor
        .request_resource_list("*.bpmn")
        .await
        .expect("listing");
    let found = pair
        .editor
        .request_resource_content(&ResourceContentParams::text("a.bpmn"))
        .await
        .expect("lookup");
    let missing = pair
        .editor
        .request_resource_content(&ResourceContentParams::text("zzz"))
        .await
        .expect("lookup");

    assert_eq!(listing.paths.len(), 2);
    assert_eq!(found.and_then(|resource| resource.content).as_deref(), Some("<a/>"));
    assert_eq!(missing, None);
}

#[rstest]
#[tokio::test]
async fn host_fetches_preview_and_element_position() {
    let pair = linked(BusConfig::default());
    pair.editor.on_preview_request(|| async { Ok(Some(String::from("<svg/>"))) });
    pair.editor.on_element_position_request(|params| async move {
        Ok((params.selector == "#task").then(Rect::default))
    });

    let preview = pair.host.request_preview().await.expect("preview");
    let located = pair
        .host
        .request_element_position("#task")
        .await
        .expect("position");
    let absent = pair
        .host
        .request_element_position("#nothing")
        .await
        .expect("position");

    assert_eq!(preview.as_deref(), Some("<svg/>"));
    assert!(located.is_some());
    assert!(absent.is_none());
}

#[rstest]
#[tokio::test]
async fn host_commands_reach_editor_listeners() {
    let pair = linked(BusConfig::default());
    let undos = Arc::new(AtomicUsize::new(0));
    let redos = Arc::new(AtomicUsize::new(0));
    let keys = Arc::new(Mutex::new(Vec::new()));
    let undo_counter = Arc::clone(&undos);
    pair.editor.on_undo(move || {
        undo_counter.fetch_add(1, Ordering::SeqCst);
    });
    let redo_counter = Arc::clone(&redos);
    pair.editor.on_redo(move || {
        redo_counter.fetch_add(1, Ordering::SeqCst);
    });
    let key_log = Arc::clone(&keys);
    pair.editor.on_keyboard_event(move |event| key_log.lock().push(event.key));

    pair.host.undo().expect("undo");
    pair.host.undo().expect("undo");
    pair.host.redo().expect("redo");
    pair.host
        .keyboard_event(&KeyboardEvent {
            event_type: KeyboardEventType::Keydown,
            key: String::from("z"),
            code: String::from("KeyZ"),
            alt_key: false,
            ctrl_key: true,
            shift_key: false,
            meta_key: false,
        })
        .expect("keyboard event");
    settle().await;

    assert_eq!(undos.load(Ordering::SeqCst), 2);
    assert_eq!(redos.load(Ordering::SeqCst), 1);
    assert_eq!(*keys.lock(), vec![String::from("z")]);
}

#[rstest]
#[tokio::test]
async fn editor_notifications_reach_host_listeners() {
    let pair = linked(BusConfig::default());
    let events = Arc::new(Mutex::new(Vec::new()));
    let ready_log = Arc::clone(&events);
    pair.host.on_ready(move || ready_log.lock().push(String::from("ready")));
    let dirty_log = Arc::clone(&events);
    pair.host
        .on_dirty_indicator_change(move |DirtyIndicator { is_dirty }| {
            dirty_log.lock().push(format!("dirty={is_dirty}"));
        });
    let edit_log = Arc::clone(&events);
    pair.host.on_new_edit(move |edit| edit_log.lock().push(format!("edit={}", edit.id)));
    let state_log = Arc::clone(&events);
    pair.host.on_state_control_command_update(move |update| {
        state_log.lock().push(format!("{:?}", update.command));
    });
    let error_log = Arc::clone(&events);
    pair.host.on_set_content_error(move |error| error_log.lock().push(error.message));
    let open_log = Arc::clone(&events);
    pair.host.on_open_file(move |file| open_log.lock().push(format!("open={}", file.path)));

    pair.editor.ready().expect("ready");
    pair.editor.dirty_indicator_change(true).expect("dirty");
    pair.editor.new_edit("e1").expect("edit");
    pair.editor.state_control_command_update(StateControlCommand::Undo).expect("state control");
    pair.editor.set_content_error("bad xml").expect("content error");
    pair.editor.open_file("other.dmn").expect("open file");
    settle().await;

    assert_eq!(
        *events.lock(),
        vec![
            String::from("ready"),
            String::from("dirty=true"),
            String::from("edit=e1"),
            String::from("Undo"),
            String::from("bad xml"),
            String::from("open=other.dmn"),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn guided_tour_messages_reach_host_listeners() {
    let pair = linked(BusConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let interactions = Arc::clone(&seen);
    pair.host.on_guided_tour_user_interaction(move |interaction| {
        interactions.lock().push(interaction.action);
    });
    let tutorials = Arc::clone(&seen);
    pair.host
        .on_guided_tour_register_tutorial(move |tutorial| tutorials.lock().push(tutorial.label));

    pair.editor
        .guided_tour_user_interaction(&UserInteraction {
            action: String::from("CLICK"),
            target: String::from("#task"),
        })
        .expect("interaction");
    pair.editor
        .guided_tour_register_tutorial(&Tutorial {
            label: String::from("intro"),
            steps: Vec::new(),
        })
        .expect("tutorial");
    settle().await;

    assert_eq!(*seen.lock(), vec![String::from("CLICK"), String::from("intro")]);
}

// ---------------------------------------------------------------------------
// Initialisation polling
// ---------------------------------------------------------------------------

const FAST: InitPolling = InitPolling {
    interval: Duration::from_millis(20),
    max_attempts: 50,
};

#[rstest]
#[tokio::test]
async fn init_polling_succeeds_on_first_answered_attempt() {
    let pair = linked(BusConfig::default());
    pair.editor.on_init(|_| async { Ok(()) });

    let attempt = pair
        .host
        .poll_init_with(&init_params(), FAST)
        .await
        .expect("initialised");

    assert_eq!(attempt, 1);
}

#[rstest]
#[tokio::test]
async fn init_polling_retries_until_the_editor_listens() {
    let pair = linked(BusConfig::default().with_unhandled_requests(UnhandledRequestPolicy::Drop));
    let received = Arc::new(Mutex::new(None));
    let late_editor = pair.editor.clone();
    let record = Arc::clone(&received);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(70)).await;
        late_editor.on_init(move |params| {
            *record.lock() = Some(params);
            async { Ok(()) }
        });
    });

    let attempt = pair
        .host
        .poll_init_with(&init_params(), FAST)
        .await
        .expect("initialised");

    assert!(attempt > 1, "first attempts should have gone unanswered");
    assert_eq!(*received.lock(), Some(init_params()));
    assert_eq!(pair.host.bus().pending_requests(), 0);
}

#[rstest]
#[tokio::test]
async fn init_polling_gives_up_after_max_attempts() {
    let pair = linked(BusConfig::default().with_unhandled_requests(UnhandledRequestPolicy::Drop));
    let polling = InitPolling {
        interval: Duration::from_millis(10),
        max_attempts: 3,
    };

    let error = pair
        .host
        .poll_init_with(&init_params(), polling)
        .await
        .expect_err("nobody answers");

    assert!(matches!(error, BusError::InitPollingExhausted { attempts: 3 }));
}

#[rstest]
#[tokio::test]
async fn init_polling_stops_on_errors_other_than_timeouts() {
    let pair = linked(BusConfig::default());

    let error = pair
        .host
        .poll_init_with(&init_params(), FAST)
        .await
        .expect_err("editor refuses");

    assert!(matches!(error, BusError::UnhandledRequest { .. }));
}

#[rstest]
fn polling_defaults_come_from_configuration() {
    let polling = InitPolling::default();
    assert_eq!(polling.interval, Duration::from_millis(100));
    assert_eq!(polling.max_attempts, 100);

    let wire = crate::tests::support::RecordingTransport::new();
    let host = HostController::new(EnvelopeBus::new("host", wire, BusConfig::default()));
    assert_eq!(host.polling(), polling);
}
