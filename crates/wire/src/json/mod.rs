//! Canonical proto3 JSON mapping.
//!
//! | Kind | Encoded as | Decoded from |
//! |------|------------|--------------|
//! | bool | `true`/`false` | boolean only |
//! | string | string | string only |
//! | bytes | base64 string | standard or URL-safe base64, padded or not |
//! | int32, uint32, float, double | number (`"NaN"`, `"Infinity"`, `"-Infinity"` for non-finite) | number or numeric string, range checked |
//! | int64, uint64, fixed64 | decimal string | string or number |
//! | enum | symbolic name (number if unmapped) | name, number, or `""` for the zero value |
//! | repeated | array | array |
//! | map | object keyed by the rendered key | object |
//! | message | object of lowerCamelCase fields | object; exact name preferred over camelCase |
//! | Timestamp | RFC 3339 string | RFC 3339 string or epoch milliseconds |
//! | Duration | `"<seconds with 9 decimals>s"` | string with a single trailing `s` |
//! | Struct, Value, Any | passthrough | passthrough |
//! | Empty | `{}` | any object |
//! | NullValue | `null` | `null` or `"NULL_VALUE"` |
//! | Wrappers | wrapped primitive, `null` when absent | wrapped primitive or `null` |
//! | FieldMask | comma-joined lowerCamelCase paths | string |
//! | ListValue | array | array |

mod collections;
mod enums;
mod message;
mod numeric;
mod scalar;
pub mod well_known;

pub use collections::{decode_map, decode_repeated, encode_map, encode_repeated, MapKey};
pub use enums::{decode_enum, encode_enum, ProtoEnum};
pub use message::{
    decode_message, decode_nested, encode_message, lookup_field, to_json_name, to_proto_name,
    Field, Message,
};
pub use numeric::{
    decode_f32, decode_f64, decode_i32, decode_i64, decode_number, decode_u32, decode_u64,
    encode_f32, encode_f64, encode_i32, encode_i64, encode_u32, encode_u64, NumberRules,
};
pub use scalar::{decode_bool, decode_bytes, decode_string, encode_bool, encode_bytes, encode_string};

use mercury_core::{Error, Result};

pub use serde_json::Value as JsonValue;

/// JSON type name of a wire value, as reported in decode errors.
pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// A value with a canonical JSON wire form.
///
/// Implemented for every [`Message`] and for raw [`JsonValue`]s, which pass
/// through untouched.
pub trait ProtoJson: Sized {
    /// Encode to the canonical wire value.
    fn to_proto_json(&self) -> JsonValue;

    /// Decode from a wire value.
    fn from_proto_json(value: &JsonValue) -> Result<Self>;

    /// Name used as the field path of top-level decode errors.
    fn wire_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<M: Message> ProtoJson for M {
    fn to_proto_json(&self) -> JsonValue {
        encode_message(self)
    }

    fn from_proto_json(value: &JsonValue) -> Result<Self> {
        decode_message(M::NAME, value)
    }

    fn wire_name() -> &'static str {
        M::NAME
    }
}

impl ProtoJson for JsonValue {
    fn to_proto_json(&self) -> JsonValue {
        self.clone()
    }

    fn from_proto_json(value: &JsonValue) -> Result<Self> {
        Ok(value.clone())
    }

    fn wire_name() -> &'static str {
        "value"
    }
}

/// Encode a value to its JSON text, as written into one text frame.
pub fn encode_text<T: ProtoJson>(value: &T) -> String {
    value.to_proto_json().to_string()
}

/// Parse JSON text and decode it.
pub fn decode_text<T: ProtoJson>(text: &str) -> Result<T> {
    let json: JsonValue = serde_json::from_str(text)
        .map_err(|e| Error::decode(T::wire_name(), "JSON text", format!("invalid JSON ({})", e)))?;
    T::from_proto_json(&json)
}

/// Build the standard type-mismatch error for `field`.
pub(crate) fn type_mismatch(field: &str, expected: &str, found: &JsonValue) -> Error {
    Error::decode(field, expected, json_type_name(found))
}
