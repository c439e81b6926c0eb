//! Query-parameter encoding for read-only verbs.
//!
//! GET, HEAD and OPTIONS carry no body, so the encoded request object is
//! flattened into query parameters. The receiving proxy parses each value back
//! as JSON where it can.

use mercury_core::{Error, Result};
use mercury_wire::{json_type_name, JsonValue};

/// Flatten an encoded request object into `(name, value)` pairs.
///
/// Strings are written verbatim, nulls are omitted and every other value is
/// written as its JSON text.
///
/// # Errors
///
/// Returns `InvalidInput` if `message` is not a JSON object.
pub fn encode_query(message: &JsonValue) -> Result<Vec<(String, String)>> {
    let object = message.as_object().ok_or_else(|| {
        Error::invalid_input(format!(
            "query parameters need an object, got {}",
            json_type_name(message)
        ))
    })?;
    Ok(object
        .iter()
        .filter_map(|(name, value)| {
            let rendered = match value {
                JsonValue::Null => return None,
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((name.clone(), rendered))
        })
        .collect())
}
