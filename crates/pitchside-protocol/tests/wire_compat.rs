// Verify wire format matches what the frontend socket listeners expect.
// These tests ensure protocol compatibility is never broken.

use pitchside_core::types::{RoomKey, SubjectId};
use pitchside_protocol::envelope::{Envelope, MatchEventType};
use pitchside_protocol::frames::{ClientRequest, EventFrame, MatchAck};

#[test]
fn join_match_with_numeric_id() {
    let req = ClientRequest::parse(r#"{"event":"join_match","payload":42}"#).unwrap();
    assert_eq!(req, ClientRequest::JoinMatch(SubjectId::from(42u64)));
    assert_eq!(req.room(), Some(RoomKey::from("match_42")));
}

#[test]
fn join_league_with_string_id() {
    let req = ClientRequest::parse(r#"{"event":"join_league","payload":"3"}"#).unwrap();
    assert_eq!(req.room(), Some(RoomKey::from("league_3")));
}

#[test]
fn leave_frames_map_to_the_same_rooms() {
    let leave_match = ClientRequest::parse(r#"{"event":"leave_match","payload":"42"}"#).unwrap();
    let leave_league = ClientRequest::parse(r#"{"event":"leave_league","payload":3}"#).unwrap();
    assert_eq!(leave_match.room(), Some(RoomKey::from("match_42")));
    assert_eq!(leave_league.room(), Some(RoomKey::from("league_3")));
}

#[test]
fn disconnect_needs_no_payload() {
    let req = ClientRequest::parse(r#"{"event":"disconnect"}"#).unwrap();
    assert_eq!(req, ClientRequest::Disconnect);
    assert!(req.room().is_none());
}

#[test]
fn malformed_frames_are_rejected() {
    for bad in [
        "not json",
        r#"{"payload":1}"#,
        r#"{"event":"join_match"}"#,
        r#"{"event":"join_match","payload":null}"#,
        r#"{"event":"join_match","payload":{"matchId":1}}"#,
        r#"{"event":"join_match","payload":[1]}"#,
        r#"{"event":"subscribe_everything","payload":1}"#,
    ] {
        assert!(ClientRequest::parse(bad).is_err(), "{bad} should not parse");
    }
}

#[test]
fn joined_match_ack_echoes_id() {
    let frame = MatchAck::joined(&SubjectId::from(42u64));
    let json = serde_json::to_string(&frame).unwrap();

    assert!(json.contains(r#""type":"event""#));
    assert!(json.contains(r#""event":"joined_match""#));
    assert!(json.contains(r#""matchId":42"#));
    assert!(json.contains(r#""message":"Joined match 42""#));
    // acks are not sequenced
    assert!(!json.contains(r#""seq""#));
}

#[test]
fn left_match_ack_keeps_string_id() {
    let frame = MatchAck::left(&SubjectId::from("42"));
    let json = serde_json::to_string(&frame).unwrap();
    assert!(json.contains(r#""event":"left_match""#));
    assert!(json.contains(r#""matchId":"42""#));
}

#[test]
fn event_frame_with_seq() {
    let ev = EventFrame::new("tick", serde_json::json!({"ts": 1234567890})).with_seq(42);
    let json = serde_json::to_string(&ev).unwrap();

    assert!(json.contains(r#""type":"event""#));
    assert!(json.contains(r#""event":"tick""#));
    assert!(json.contains(r#""seq":42"#));
}

#[test]
fn score_update_frame() {
    let frame = Envelope::score_update(
        SubjectId::from(5u64),
        serde_json::json!({"home": 2, "away": 1}),
    )
    .to_frame();
    let json = serde_json::to_string(&frame).unwrap();

    assert!(json.contains(r#""event":"score_update""#));
    assert!(json.contains(r#""matchId":5"#));
    assert!(json.contains(r#""score":{"away":1,"home":2}"#) || json.contains(r#""score":{"home":2,"away":1}"#));
    assert!(json.contains(r#""timestamp":""#));
}

#[test]
fn match_event_type_is_lowercase_on_the_wire() {
    let frame = Envelope::match_event(
        SubjectId::from(5u64),
        MatchEventType::Substitution,
        serde_json::json!({}),
    )
    .to_frame();
    let json = serde_json::to_string(&frame).unwrap();
    assert!(json.contains(r#""eventType":"substitution""#));
}
