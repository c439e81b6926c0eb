//! Repeated fields and maps.

use super::{type_mismatch, JsonValue};
use mercury_core::{Error, Result};
use serde_json::Map;
use std::collections::BTreeMap;

/// Encode a repeated field as an array.
pub fn encode_repeated<T>(values: &[T], encode: impl Fn(&T) -> JsonValue) -> JsonValue {
    JsonValue::Array(values.iter().map(encode).collect())
}

/// Decode a repeated field from an array.
///
/// `decode` receives the element path (`[i]`), so a failure on the third
/// element of `items` reads `items[2]`.
pub fn decode_repeated<T>(
    field: &str,
    value: &JsonValue,
    decode: impl Fn(&str, &JsonValue) -> Result<T>,
) -> Result<Vec<T>> {
    let items = value
        .as_array()
        .ok_or_else(|| type_mismatch(field, "array", value))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| decode(&format!("[{}]", i), item).map_err(|e| e.within(field)))
        .collect()
}

/// Map key kinds. Keys always travel as object-key strings.
pub trait MapKey: Ord + Sized {
    /// Render the key.
    fn to_key(&self) -> String;

    /// Parse a rendered key.
    fn from_key(key: &str) -> Option<Self>;
}

impl MapKey for String {
    fn to_key(&self) -> String {
        self.clone()
    }

    fn from_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }
}

impl MapKey for bool {
    fn to_key(&self) -> String {
        self.to_string()
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

macro_rules! integer_map_key {
    ($($t:ty),*) => {
        $(
            impl MapKey for $t {
                fn to_key(&self) -> String {
                    self.to_string()
                }

                fn from_key(key: &str) -> Option<Self> {
                    key.parse().ok()
                }
            }
        )*
    };
}

integer_map_key!(i32, i64, u32, u64);

/// Encode a map as an object.
pub fn encode_map<K: MapKey, V>(
    values: &BTreeMap<K, V>,
    encode: impl Fn(&V) -> JsonValue,
) -> JsonValue {
    let object: Map<String, JsonValue> = values
        .iter()
        .map(|(k, v)| (k.to_key(), encode(v)))
        .collect();
    JsonValue::Object(object)
}

/// Decode a map from an object.
///
/// Entry failures are reported as `field["key"]`.
pub fn decode_map<K: MapKey, V>(
    field: &str,
    value: &JsonValue,
    decode: impl Fn(&str, &JsonValue) -> Result<V>,
) -> Result<BTreeMap<K, V>> {
    let object = value
        .as_object()
        .ok_or_else(|| type_mismatch(field, "object", value))?;
    let mut out = BTreeMap::new();
    for (raw_key, raw_value) in object {
        let path = format!("[{:?}]", raw_key);
        let key = K::from_key(raw_key).ok_or_else(|| {
            Error::decode(format!("{}{}", field, path), "map key", format!("{:?}", raw_key))
        })?;
        let decoded = decode(&path, raw_value).map_err(|e| e.within(field))?;
        out.insert(key, decoded);
    }
    Ok(out)
}
