//! Hub Wire Protocol Tests
//!
//! Exercises the tagged-JSON frame format from a client's point of view:
//! what a websocket client writes must parse, and what the hub pushes
//! must carry the documented shape.

use pretty_assertions::assert_eq;

use campus_match::presentation::hub::{ClientFrame, MatchPayload, ServerFrame};

#[test]
fn send_message_frame_parses() {
    let raw = r#"{"type":"SendMessage","data":{"match_id":"42","content":"hey!"}}"#;
    let frame: ClientFrame = serde_json::from_str(raw).unwrap();

    match frame {
        ClientFrame::SendMessage { match_id, content } => {
            assert_eq!(match_id, "42");
            assert_eq!(content, "hey!");
        }
        other => panic!("parsed wrong variant: {other:?}"),
    }
}

#[test]
fn typing_indicator_defaults_to_typing() {
    let raw = r#"{"type":"SendTypingIndicator","data":{"match_id":"42"}}"#;
    let frame: ClientFrame = serde_json::from_str(raw).unwrap();

    match frame {
        ClientFrame::SendTypingIndicator { is_typing, .. } => assert!(is_typing),
        other => panic!("parsed wrong variant: {other:?}"),
    }
}

#[test]
fn ping_frame_needs_no_data() {
    let raw = r#"{"type":"Ping"}"#;
    let frame: ClientFrame = serde_json::from_str(raw).unwrap();
    assert!(matches!(frame, ClientFrame::Ping));
}

#[test]
fn unknown_frame_type_is_rejected() {
    let raw = r#"{"type":"SelfDestruct","data":{}}"#;
    assert!(serde_json::from_str::<ClientFrame>(raw).is_err());
}

#[test]
fn new_match_event_has_documented_shape() {
    let frame = ServerFrame::NewMatch(MatchPayload {
        match_id: "7".into(),
        other_student_id: "99".into(),
        created_at: "2025-09-01T12:00:00+00:00".into(),
    });

    let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
    assert_eq!(json["type"], "NewMatch");
    assert_eq!(json["data"]["match_id"], "7");
    assert_eq!(json["data"]["other_student_id"], "99");
}

#[test]
fn error_event_carries_code_and_message() {
    let frame = ServerFrame::Error {
        code: "match_closed".into(),
        message: "Match is closed".into(),
    };

    let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
    assert_eq!(json["type"], "Error");
    assert_eq!(json["data"]["code"], "match_closed");
}
