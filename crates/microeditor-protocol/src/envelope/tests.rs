//! Unit tests for envelope construction and the wire codec.

use rstest::rstest;
use serde_json::{Value, json};

use super::*;

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn request_carries_request_kind_and_id() {
    let envelope = Envelope::request(RequestKind::Content, CorrelationId::from(1), None);
    assert_eq!(envelope.kind(), MessageKind::RequestContent);
    assert_eq!(envelope.id().map(CorrelationId::as_str), Some("1"));
    assert_eq!(envelope.data(), None);
}

#[test]
fn return_reuses_id_and_pairs_kind() {
    let id = CorrelationId::from("abc");
    let envelope = Envelope::return_for(
        RequestKind::Content,
        id.clone(),
        Some(json!({"content": "abc"})),
    );
    assert_eq!(envelope.kind(), MessageKind::ReturnContent);
    assert_eq!(envelope.id(), Some(&id));
    assert_eq!(envelope.family(), MessageFamily::Return(RequestKind::Content));
}

#[test]
fn notify_has_no_id() {
    let envelope = Envelope::notify(NotifyKind::Ready, None);
    assert_eq!(envelope.kind(), MessageKind::NotifyReady);
    assert!(envelope.id().is_none());
}

#[test]
fn null_payload_is_treated_as_absent() {
    let envelope = Envelope::notify(NotifyKind::EditorUndo, Some(Value::Null));
    assert_eq!(envelope.data(), None);
    assert_eq!(envelope.to_wire(), json!({"type": 15}));
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

#[test]
fn encodes_return_with_all_fields() {
    let envelope = Envelope::return_for(
        RequestKind::Content,
        CorrelationId::from(1),
        Some(json!({"content": "abc"})),
    );
    assert_eq!(
        envelope.into_wire(),
        json!({"type": 5, "messageId": "1", "data": {"content": "abc"}})
    );
}

#[test]
fn encodes_notify_without_message_id() {
    let envelope = Envelope::notify(
        NotifyKind::DirtyIndicatorChange,
        Some(json!({"isDirty": true})),
    );
    let json = envelope.to_json_string();
    assert!(json.contains(r#""type":7"#));
    assert!(!json.contains("messageId"));
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[test]
fn decodes_spec_shaped_return() {
    let wire = json!({"type": 5, "messageId": "1", "data": {"content": "abc"}});
    let envelope = Envelope::from_wire(&wire).expect("decode");
    assert_eq!(envelope.kind(), MessageKind::ReturnContent);
    assert_eq!(envelope.id(), Some(&CorrelationId::from(1)));
    assert_eq!(envelope.data(), Some(&json!({"content": "abc"})));
}

#[test]
fn integer_message_ids_are_normalised() {
    let wire = json!({"type": 4, "messageId": 17});
    let envelope = Envelope::from_wire(&wire).expect("decode");
    assert_eq!(envelope.id().map(CorrelationId::as_str), Some("17"));
}

#[test]
fn notify_with_message_id_drops_the_id() {
    let wire = json!({"type": 8, "messageId": "stray"});
    let envelope = Envelope::from_wire(&wire).expect("decode");
    assert_eq!(envelope.kind(), MessageKind::NotifyReady);
    assert!(envelope.id().is_none());
}

#[test]
fn decodes_from_text_frame() {
    let envelope = Envelope::from_json_str(r#"{"type":13,"messageId":"9"}"#).expect("decode");
    assert_eq!(envelope.kind(), MessageKind::RequestPreview);
}

#[rstest]
#[case::array(json!([1, 2]), "not_an_object")]
#[case::string(json!("hello"), "not_an_object")]
#[case::null(Value::Null, "not_an_object")]
#[case::missing_type(json!({"messageId": "1"}), "missing_type")]
#[case::string_type(json!({"type": "REQUEST_CONTENT"}), "invalid_type")]
#[case::negative_type(json!({"type": -1}), "invalid_type")]
#[case::float_type(json!({"type": 1.5}), "invalid_type")]
#[case::unknown_type(json!({"type": 99}), "unknown_type")]
#[case::request_without_id(json!({"type": 0}), "missing_message_id")]
#[case::return_without_id(json!({"type": 5, "data": {}}), "missing_message_id")]
#[case::object_id(json!({"type": 4, "messageId": {"n": 1}}), "invalid_message_id")]
#[case::bool_id(json!({"type": 4, "messageId": true}), "invalid_message_id")]
fn rejects_malformed_envelopes(#[case] wire: Value, #[case] reason: &str) {
    let error = Envelope::from_wire(&wire).expect_err("should be malformed");
    assert_eq!(error.reason(), reason, "unexpected error: {error}");
}

#[test]
fn rejects_invalid_json_frames() {
    let error = Envelope::from_json_str("{not json").expect_err("should fail");
    assert!(matches!(error, EnvelopeError::Json { .. }));
}

// ---------------------------------------------------------------------------
// Correlation ids
// ---------------------------------------------------------------------------

#[test]
fn correlation_id_serialises_as_string() {
    let json = serde_json::to_string(&CorrelationId::from(3)).expect("serialise");
    assert_eq!(json, r#""3""#);
    let back: CorrelationId = serde_json::from_str("3").expect("deserialise");
    assert_eq!(back, CorrelationId::from("3"));
}

// ---------------------------------------------------------------------------
// Error markers
// ---------------------------------------------------------------------------

#[test]
fn handler_error_marker_has_stable_shape() {
    let data = ReturnError::handler_error("boom").into_data();
    assert_eq!(
        data,
        json!({"envelopeError": {"kind": "handler_error", "message": "boom"}})
    );
}

#[test]
fn marker_payloads_classify_as_errors() {
    let data = ReturnError::unhandled(RequestKind::Preview).into_data();
    match ReturnPayload::from_data(Some(data)) {
        ReturnPayload::Error(error) => {
            assert_eq!(error.kind(), ReturnErrorKind::UnhandledRequest);
            assert!(error.message().contains("REQUEST_PREVIEW"));
        }
        other @ ReturnPayload::Value(_) => panic!("expected error marker, got {other:?}"),
    }
}

#[rstest]
#[case::absent(None)]
#[case::plain(Some(json!({"content": "abc"})))]
#[case::extra_keys(Some(json!({
    "envelopeError": {"kind": "handler_error", "message": "x"},
    "other": 1
})))]
#[case::bad_marker(Some(json!({"envelopeError": "nope"})))]
#[case::scalar(Some(json!("svg")))]
fn ordinary_payloads_classify_as_values(#[case] data: Option<Value>) {
    assert_eq!(
        ReturnPayload::from_data(data.clone()),
        ReturnPayload::Value(data)
    );
}
