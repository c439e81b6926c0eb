//! bool, string and bytes.

use super::{type_mismatch, JsonValue};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use mercury_core::{Error, Result};

/// Encode a bool.
pub fn encode_bool(value: &bool) -> JsonValue {
    JsonValue::Bool(*value)
}

/// Decode a bool; only JSON booleans are accepted.
pub fn decode_bool(field: &str, value: &JsonValue) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| type_mismatch(field, "boolean", value))
}

/// Encode a string.
#[allow(clippy::ptr_arg)]
pub fn encode_string(value: &String) -> JsonValue {
    JsonValue::String(value.clone())
}

/// Decode a string; only JSON strings are accepted.
pub fn decode_string(field: &str, value: &JsonValue) -> Result<String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| type_mismatch(field, "string", value))
}

/// Encode bytes as standard padded base64.
#[allow(clippy::ptr_arg)]
pub fn encode_bytes(value: &Vec<u8>) -> JsonValue {
    JsonValue::String(STANDARD.encode(value))
}

/// Decode base64 bytes.
///
/// Standard and URL-safe alphabets are both accepted, with or without padding.
pub fn decode_bytes(field: &str, value: &JsonValue) -> Result<Vec<u8>> {
    let text = value
        .as_str()
        .ok_or_else(|| type_mismatch(field, "base64 string", value))?;
    for engine in [&STANDARD, &URL_SAFE, &STANDARD_NO_PAD, &URL_SAFE_NO_PAD] {
        if let Ok(bytes) = engine.decode(text) {
            return Ok(bytes);
        }
    }
    Err(Error::decode(field, "base64 string", "malformed base64"))
}
