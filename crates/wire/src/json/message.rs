//! Message (object) encoding driven by a static field table.
//!
//! Each message type lists its fields once as [`Field`] entries; encode walks
//! the table writing lowerCamelCase keys, decode walks it reading either the
//! declared proto name or the camelCase name.

use super::{type_mismatch, JsonValue};
use mercury_core::Result;
use serde_json::Map;

/// One field of a message.
pub struct Field<M> {
    /// Declared (snake_case) name
    pub name: &'static str,
    /// lowerCamelCase name written on the wire
    pub json_name: &'static str,
    /// Read the field, `None` when it is absent and must be omitted
    pub encode: fn(&M) -> Option<JsonValue>,
    /// Store a decoded wire value into the field
    pub decode: fn(&mut M, &JsonValue) -> Result<()>,
}

impl<M> Field<M> {
    /// Describe a field.
    pub const fn new(
        name: &'static str,
        json_name: &'static str,
        encode: fn(&M) -> Option<JsonValue>,
        decode: fn(&mut M, &JsonValue) -> Result<()>,
    ) -> Self {
        Self {
            name,
            json_name,
            encode,
            decode,
        }
    }
}

/// A message type with a proto3 JSON form.
pub trait Message: Default + Send + 'static {
    /// Message name, used as the root of decode error paths.
    const NAME: &'static str;

    /// Field table.
    const FIELDS: &'static [Field<Self>];
}

/// Encode a message to a JSON object. Absent fields are omitted.
pub fn encode_message<M: Message>(message: &M) -> JsonValue {
    let mut object = Map::new();
    for field in M::FIELDS {
        if let Some(value) = (field.encode)(message) {
            object.insert(field.json_name.to_string(), value);
        }
    }
    JsonValue::Object(object)
}

/// Decode a message from a JSON object.
///
/// Fields missing from the object, or present as `null`, keep their default.
/// Keys that match no field are ignored. Field errors are reported under
/// `field` (`field` is the message name at the top level).
pub fn decode_message<M: Message>(field: &str, value: &JsonValue) -> Result<M> {
    decode_nested(field, value)
}

/// Decode a message held in a parent's field, errors reading `field.inner`.
///
/// Use from a parent's field table; the parent's own decode adds its prefix.
pub fn decode_nested<M: Message>(field: &str, value: &JsonValue) -> Result<M> {
    let object = value
        .as_object()
        .ok_or_else(|| type_mismatch(field, "object", value))?;
    let mut message = M::default();
    for entry in M::FIELDS {
        if let Some(raw) = lookup_field(object, entry.name, entry.json_name) {
            (entry.decode)(&mut message, raw).map_err(|e| e.within(field))?;
        }
    }
    Ok(message)
}

/// Find a field in a wire object, trying the exact declared name first.
///
/// Returns `None` for missing keys and for `null` values.
pub fn lookup_field<'a>(
    object: &'a Map<String, JsonValue>,
    name: &str,
    json_name: &str,
) -> Option<&'a JsonValue> {
    object
        .get(name)
        .filter(|v| !v.is_null())
        .or_else(|| object.get(json_name).filter(|v| !v.is_null()))
}

/// snake_case to lowerCamelCase.
pub fn to_json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// lowerCamelCase to snake_case.
pub fn to_proto_name(json_name: &str) -> String {
    let mut out = String::with_capacity(json_name.len() + 4);
    for c in json_name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
