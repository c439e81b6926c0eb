//! 32-bit and 64-bit numeric kinds.
//!
//! 32-bit kinds travel as JSON numbers. 64-bit integers travel as decimal
//! strings because a JSON number cannot carry them losslessly through a
//! double-precision parser.

use super::{type_mismatch, JsonValue};
use mercury_core::{Error, Result};

const NAN_TOKEN: &str = "NaN";
const INFINITY_TOKEN: &str = "Infinity";
const NEG_INFINITY_TOKEN: &str = "-Infinity";

/// Validation applied by [`decode_number`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRules {
    /// Inclusive lower bound for finite values
    pub min: Option<f64>,
    /// Inclusive upper bound for finite values
    pub max: Option<f64>,
    /// Reject values with a fractional part
    pub integral: bool,
    /// Accept `"NaN"`, `"Infinity"` and `"-Infinity"`
    pub allow_non_finite: bool,
}

impl NumberRules {
    /// No range, fractions allowed, non-finite rejected.
    pub const ANY_FINITE: NumberRules = NumberRules {
        min: None,
        max: None,
        integral: false,
        allow_non_finite: false,
    };

    /// Rules for int32.
    pub const INT32: NumberRules = NumberRules {
        min: Some(i32::MIN as f64),
        max: Some(i32::MAX as f64),
        integral: true,
        allow_non_finite: false,
    };

    /// Rules for uint32.
    pub const UINT32: NumberRules = NumberRules {
        min: Some(0.0),
        max: Some(u32::MAX as f64),
        integral: true,
        allow_non_finite: false,
    };

    /// Rules for float.
    pub const FLOAT: NumberRules = NumberRules {
        min: Some(-(f32::MAX as f64)),
        max: Some(f32::MAX as f64),
        integral: false,
        allow_non_finite: true,
    };

    /// Rules for double.
    pub const DOUBLE: NumberRules = NumberRules {
        min: None,
        max: None,
        integral: false,
        allow_non_finite: true,
    };
}

/// Decode a JSON number or numeric string under `rules`.
pub fn decode_number(field: &str, value: &JsonValue, rules: &NumberRules) -> Result<f64> {
    let number = match value {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::decode(field, "number", n.to_string()))?,
        JsonValue::String(s) => match s.as_str() {
            NAN_TOKEN => f64::NAN,
            INFINITY_TOKEN => f64::INFINITY,
            NEG_INFINITY_TOKEN => f64::NEG_INFINITY,
            text => {
                let parsed: f64 = text
                    .trim()
                    .parse()
                    .map_err(|_| Error::decode(field, "numeric string", format!("{:?}", text)))?;
                // Rust also parses "inf"/"nan"; only the canonical tokens count.
                if !parsed.is_finite() {
                    return Err(Error::decode(field, "numeric string", format!("{:?}", text)));
                }
                parsed
            }
        },
        other => return Err(type_mismatch(field, "number or numeric string", other)),
    };

    if !number.is_finite() {
        if rules.allow_non_finite {
            return Ok(number);
        }
        return Err(Error::decode(field, "finite number", number.to_string()));
    }
    if rules.integral && number.fract() != 0.0 {
        return Err(Error::decode(field, "integer", number.to_string()));
    }
    let below = rules.min.map_or(false, |min| number < min);
    let above = rules.max.map_or(false, |max| number > max);
    if below || above {
        return Err(Error::decode(
            field,
            format!(
                "number in range [{}, {}]",
                rules.min.map_or("-inf".to_string(), |m| m.to_string()),
                rules.max.map_or("inf".to_string(), |m| m.to_string()),
            ),
            number.to_string(),
        ));
    }
    Ok(number)
}

// ============================================================================
// 32-bit kinds
// ============================================================================

/// Encode an int32.
pub fn encode_i32(value: &i32) -> JsonValue {
    JsonValue::from(*value)
}

/// Decode an int32.
pub fn decode_i32(field: &str, value: &JsonValue) -> Result<i32> {
    decode_number(field, value, &NumberRules::INT32).map(|n| n as i32)
}

/// Encode a uint32.
pub fn encode_u32(value: &u32) -> JsonValue {
    JsonValue::from(*value)
}

/// Decode a uint32.
pub fn decode_u32(field: &str, value: &JsonValue) -> Result<u32> {
    decode_number(field, value, &NumberRules::UINT32).map(|n| n as u32)
}

/// Encode a double; non-finite values become their literal tokens.
pub fn encode_f64(value: &f64) -> JsonValue {
    if value.is_nan() {
        JsonValue::String(NAN_TOKEN.to_string())
    } else if value.is_infinite() {
        let token = if value.is_sign_positive() {
            INFINITY_TOKEN
        } else {
            NEG_INFINITY_TOKEN
        };
        JsonValue::String(token.to_string())
    } else {
        match serde_json::Number::from_f64(*value) {
            Some(n) => JsonValue::Number(n),
            None => JsonValue::String(value.to_string()),
        }
    }
}

/// Decode a double.
pub fn decode_f64(field: &str, value: &JsonValue) -> Result<f64> {
    decode_number(field, value, &NumberRules::DOUBLE)
}

/// Encode a float.
///
/// Goes through the shortest decimal form of the `f32` so `0.1f32` is
/// written as `0.1`, not `0.10000000149011612`.
pub fn encode_f32(value: &f32) -> JsonValue {
    if !value.is_finite() {
        return encode_f64(&(*value as f64));
    }
    let widened: f64 = value.to_string().parse().unwrap_or(*value as f64);
    encode_f64(&widened)
}

/// Decode a float.
pub fn decode_f32(field: &str, value: &JsonValue) -> Result<f32> {
    decode_number(field, value, &NumberRules::FLOAT).map(|n| n as f32)
}

// ============================================================================
// 64-bit kinds
// ============================================================================

/// Encode an int64 / sint64 / sfixed64 as a decimal string.
pub fn encode_i64(value: &i64) -> JsonValue {
    JsonValue::String(value.to_string())
}

/// Decode an int64 from a decimal string or an integral JSON number.
pub fn decode_i64(field: &str, value: &JsonValue) -> Result<i64> {
    match value {
        JsonValue::String(s) => s
            .trim()
            .parse()
            .map_err(|_| Error::decode(field, "int64 decimal string", format!("{:?}", s))),
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral_f64_to_i64))
            .ok_or_else(|| Error::decode(field, "int64", n.to_string())),
        other => Err(type_mismatch(field, "string or number", other)),
    }
}

/// Encode a uint64 / fixed64 as a decimal string.
pub fn encode_u64(value: &u64) -> JsonValue {
    JsonValue::String(value.to_string())
}

/// Decode a uint64 from a decimal string or an integral JSON number.
pub fn decode_u64(field: &str, value: &JsonValue) -> Result<u64> {
    match value {
        JsonValue::String(s) => s
            .trim()
            .parse()
            .map_err(|_| Error::decode(field, "uint64 decimal string", format!("{:?}", s))),
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(integral_f64_to_u64))
            .ok_or_else(|| Error::decode(field, "uint64", n.to_string())),
        other => Err(type_mismatch(field, "string or number", other)),
    }
}

fn integral_f64_to_i64(f: f64) -> Option<i64> {
    // 2^63 itself is out of range, hence the strict upper bound
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn integral_f64_to_u64(f: f64) -> Option<u64> {
    if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}
