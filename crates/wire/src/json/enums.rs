//! Enum kinds.

use super::{type_mismatch, JsonValue};
use mercury_core::{Error, Result};

/// A protobuf enum with a static name table.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Default)]
/// enum Status { #[default] Unknown = 0, Active = 1 }
///
/// impl ProtoEnum for Status {
///     const VALUES: &'static [(&'static str, i32)] = &[("UNKNOWN", 0), ("ACTIVE", 1)];
///     fn from_number(n: i32) -> Option<Self> { ... }
///     fn number(self) -> i32 { self as i32 }
/// }
/// ```
pub trait ProtoEnum: Sized + Copy {
    /// Symbolic names and their numeric codes.
    const VALUES: &'static [(&'static str, i32)];

    /// Convert a numeric code, `None` if unmapped.
    fn from_number(number: i32) -> Option<Self>;

    /// Numeric code of this value.
    fn number(self) -> i32;

    /// Symbolic name of this value, if the table has one.
    fn name(self) -> Option<&'static str> {
        let number = self.number();
        Self::VALUES
            .iter()
            .find(|(_, n)| *n == number)
            .map(|(name, _)| *name)
    }

    /// Look a value up by symbolic name.
    fn from_name(name: &str) -> Option<Self> {
        Self::VALUES
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, number)| Self::from_number(*number))
    }
}

/// Encode an enum as its symbolic name, or its number if unnamed.
pub fn encode_enum<E: ProtoEnum>(value: &E) -> JsonValue {
    match value.name() {
        Some(name) => JsonValue::String(name.to_string()),
        None => JsonValue::from(value.number()),
    }
}

/// Decode an enum from its symbolic name or numeric code.
///
/// An empty string decodes to the zero value. Unmapped names and numbers fail.
pub fn decode_enum<E: ProtoEnum>(field: &str, value: &JsonValue) -> Result<E> {
    match value {
        JsonValue::String(s) if s.is_empty() => E::from_number(0)
            .ok_or_else(|| Error::decode(field, "enum with a zero value", "\"\"")),
        JsonValue::String(s) => {
            if let Some(found) = E::from_name(s) {
                return Ok(found);
            }
            s.parse::<i32>()
                .ok()
                .and_then(E::from_number)
                .ok_or_else(|| Error::decode(field, "known enum name", format!("{:?}", s)))
        }
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .and_then(E::from_number)
            .ok_or_else(|| Error::decode(field, "known enum number", n.to_string())),
        other => Err(type_mismatch(field, "enum name or number", other)),
    }
}
