//! Field paths in decode errors.

use crate::common::*;

fn decode_error(wire: Value) -> (String, String) {
    match Note::from_proto_json(&wire) {
        Err(Error::Decode {
            field, expected, ..
        }) => (field, expected),
        other => panic!("Expected Decode error, got {:?}", other),
    }
}

#[test]
fn test_top_level_field() {
    let (field, expected) = decode_error(json!({"text": 5}));
    assert_eq!(field, "Note.text");
    assert_eq!(expected, "string");
}

#[test]
fn test_nested_field() {
    let (field, _) = decode_error(json!({"author": {"userId": true}}));
    assert_eq!(field, "Note.author.user_id");
}

#[test]
fn test_repeated_element() {
    let (field, _) = decode_error(json!({"tags": ["ok", "fine", 3]}));
    assert_eq!(field, "Note.tags[2]");
}

#[test]
fn test_map_value() {
    let (field, _) = decode_error(json!({"counts": {"k": "many"}}));
    assert_eq!(field, "Note.counts[\"k\"]");
}

#[test]
fn test_wrong_shape_message() {
    let (field, expected) = decode_error(json!(["not", "an", "object"]));
    assert_eq!(field, "Note");
    assert_eq!(expected, "object");
}

#[test]
fn test_duration_suffix() {
    let (field, _) = decode_error(json!({"ttlSeconds": "1.5"}));
    assert_eq!(field, "Note.ttl_seconds");
}
