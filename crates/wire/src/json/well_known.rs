//! Well-known types.

use super::{type_mismatch, JsonValue};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use mercury_core::{Error, Result};
use serde_json::Map;

use super::message::{to_json_name, to_proto_name};

// ============================================================================
// Timestamp
// ============================================================================

/// Encode a Timestamp as RFC 3339 in UTC (`Z` suffix).
pub fn encode_timestamp(value: &DateTime<Utc>) -> JsonValue {
    JsonValue::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Decode a Timestamp from RFC 3339 text or epoch milliseconds.
pub fn decode_timestamp(field: &str, value: &JsonValue) -> Result<DateTime<Utc>> {
    match value {
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| Error::decode(field, "RFC 3339 timestamp", format!("{:?} ({})", s, e))),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| Error::decode(field, "epoch milliseconds", n.to_string())),
        other => Err(type_mismatch(field, "timestamp string", other)),
    }
}

// ============================================================================
// Duration
// ============================================================================

/// Encode a Duration given in seconds, e.g. `1.5` as `"1.500000000s"`.
pub fn encode_duration(seconds: &f64) -> JsonValue {
    JsonValue::String(format!("{:.9}s", seconds))
}

/// Decode a Duration to seconds. Exactly one trailing `s` is required.
pub fn decode_duration(field: &str, value: &JsonValue) -> Result<f64> {
    let text = value
        .as_str()
        .ok_or_else(|| type_mismatch(field, "duration string", value))?;
    let bad = || Error::decode(field, "duration like \"1.5s\"", format!("{:?}", text));
    if text.matches('s').count() != 1 {
        return Err(bad());
    }
    let digits = text.strip_suffix('s').ok_or_else(bad)?;
    let seconds: f64 = digits.parse().map_err(|_| bad())?;
    if !seconds.is_finite() {
        return Err(bad());
    }
    Ok(seconds)
}

// ============================================================================
// Struct, Value, Any, ListValue
// ============================================================================

/// Encode a Struct.
pub fn encode_struct(value: &Map<String, JsonValue>) -> JsonValue {
    JsonValue::Object(value.clone())
}

/// Decode a Struct from an object, or from a string holding JSON object text.
pub fn decode_struct(field: &str, value: &JsonValue) -> Result<Map<String, JsonValue>> {
    match value {
        JsonValue::Object(map) => Ok(map.clone()),
        JsonValue::String(text) => match serde_json::from_str::<JsonValue>(text) {
            Ok(JsonValue::Object(map)) => Ok(map),
            Ok(other) => Err(type_mismatch(field, "object", &other)),
            Err(e) => Err(Error::decode(field, "object", format!("invalid JSON ({})", e))),
        },
        other => Err(type_mismatch(field, "object", other)),
    }
}

/// Encode a Value or Any (passthrough).
pub fn encode_value(value: &JsonValue) -> JsonValue {
    value.clone()
}

/// Decode a Value or Any (passthrough).
pub fn decode_value(_field: &str, value: &JsonValue) -> Result<JsonValue> {
    Ok(value.clone())
}

/// Encode a ListValue.
pub fn encode_list_value(values: &[JsonValue]) -> JsonValue {
    JsonValue::Array(values.to_vec())
}

/// Decode a ListValue.
pub fn decode_list_value(field: &str, value: &JsonValue) -> Result<Vec<JsonValue>> {
    value
        .as_array()
        .cloned()
        .ok_or_else(|| type_mismatch(field, "array", value))
}

// ============================================================================
// Empty and NullValue
// ============================================================================

/// Encode Empty.
pub fn encode_empty() -> JsonValue {
    JsonValue::Object(Map::new())
}

/// Decode Empty; any object is accepted and its contents ignored.
pub fn decode_empty(field: &str, value: &JsonValue) -> Result<()> {
    match value {
        JsonValue::Object(_) => Ok(()),
        other => Err(type_mismatch(field, "object", other)),
    }
}

/// Encode NullValue.
pub fn encode_null() -> JsonValue {
    JsonValue::Null
}

/// Decode NullValue from `null` or `"NULL_VALUE"`.
pub fn decode_null(field: &str, value: &JsonValue) -> Result<()> {
    match value {
        JsonValue::Null => Ok(()),
        JsonValue::String(s) if s == "NULL_VALUE" => Ok(()),
        other => Err(type_mismatch(field, "null", other)),
    }
}

// ============================================================================
// Wrappers and FieldMask
// ============================================================================

/// Encode a wrapper type (`Int32Value`, `StringValue`, ...); `None` is `null`.
pub fn encode_wrapper<T>(value: &Option<T>, encode: impl Fn(&T) -> JsonValue) -> JsonValue {
    value.as_ref().map_or(JsonValue::Null, encode)
}

/// Decode a wrapper type; `null` is `None`.
pub fn decode_wrapper<T>(
    field: &str,
    value: &JsonValue,
    decode: impl Fn(&str, &JsonValue) -> Result<T>,
) -> Result<Option<T>> {
    if value.is_null() {
        return Ok(None);
    }
    decode(field, value).map(Some)
}

/// Encode a FieldMask of snake_case paths as one comma-joined camelCase string.
pub fn encode_field_mask(paths: &[String]) -> JsonValue {
    let rendered: Vec<String> = paths
        .iter()
        .map(|p| p.split('.').map(to_json_name).collect::<Vec<_>>().join("."))
        .collect();
    JsonValue::String(rendered.join(","))
}

/// Decode a FieldMask back to snake_case paths.
pub fn decode_field_mask(field: &str, value: &JsonValue) -> Result<Vec<String>> {
    let text = value
        .as_str()
        .ok_or_else(|| type_mismatch(field, "field mask string", value))?;
    Ok(text
        .split(',')
        .filter(|p| !p.is_empty())
        .map(|p| p.split('.').map(to_proto_name).collect::<Vec<_>>().join("."))
        .collect())
}
