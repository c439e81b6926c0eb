//! Whole-message encoding.

use crate::common::*;
use mercury::wire::{decode_text, encode_text};

#[test]
fn test_full_note_wire_form() {
    let wire = full_note().to_proto_json();
    assert_eq!(
        wire,
        json!({
            "text": "hello",
            "mood": "HAPPY",
            "tags": ["a", "b"],
            "counts": {"likes": "-3", "views": "9007199254740993"},
            "attachment": "VGVzdA==",
            "created": "2020-01-02T03:04:05Z",
            "ttlSeconds": "1.500000000s",
            "author": {"userId": 42, "displayName": "Ada"},
            "sequence": "18446744073709551615",
            "score": 0.25
        })
    );
}

#[test]
fn test_full_note_round_trip() {
    let note = full_note();
    let decoded = Note::from_proto_json(&note.to_proto_json()).unwrap();
    assert_eq!(decoded, note);

    let text = encode_text(&note);
    assert_eq!(decode_text::<Note>(&text).unwrap(), note);
}

#[test]
fn test_default_note_is_empty_object() {
    assert_eq!(Note::default().to_proto_json(), json!({}));
    assert_eq!(Note::from_proto_json(&json!({})).unwrap(), Note::default());
}

#[test]
fn test_lenient_inputs() {
    let note = Note::from_proto_json(&json!({
        "mood": 2,
        "sequence": 12,
        "score": "0.5",
        "created": 1000,
        "author": {"user_id": "7", "display_name": null},
        "attachment": "VGVzdA",
        "unknownField": {"ignored": true}
    }))
    .unwrap();
    assert_eq!(note.mood, Mood::Sad);
    assert_eq!(note.sequence, 12);
    assert_eq!(note.score, 0.5);
    assert_eq!(note.created.map(|t| t.timestamp()), Some(1));
    assert_eq!(
        note.author,
        Some(Author {
            user_id: 7,
            display_name: String::new(),
        })
    );
    assert_eq!(note.attachment, b"Test".to_vec());
}

#[test]
fn test_enum_edge_cases() {
    let note = Note::from_proto_json(&json!({"mood": ""})).unwrap();
    assert_eq!(note.mood, Mood::Unknown);
    assert!(matches!(
        Note::from_proto_json(&json!({"mood": "ANGRY"})),
        Err(Error::Decode { .. })
    ));
}

#[test]
fn test_untyped_values_pass_through() {
    let raw = json!({"anything": [1, {"goes": null}]});
    assert_eq!(Value::from_proto_json(&raw).unwrap(), raw);
    assert_eq!(raw.to_proto_json(), raw);
}
