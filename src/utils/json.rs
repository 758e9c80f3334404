//! JSON helpers shared by the Trakt and TMDB clients.

use crate::{Error, Result};
use serde_json::Value;

/// Deserialize a JSON document, reporting the offending payload on failure.
pub fn deserialize_json(document: &str) -> Result<Value> {
    serde_json::from_str(document).map_err(|_| Error::MalformedJson(document.to_string()))
}

/// Follow `path` through nested objects, failing if any key is missing or null.
pub fn extract_value_from<'a>(data: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = data;
    for key in path {
        current = match current.get(key) {
            Some(Value::Null) | None => {
                return Err(Error::MissingField(format!("{:?}", path)));
            }
            Some(value) => value,
        };
    }
    Ok(current)
}

/// Whether a string parses as an integer (public Trakt list IDs must).
pub fn is_int_like(value: &str) -> bool {
    value.trim().parse::<i64>().is_ok()
}

/// Read an ID that Trakt may send as a number or a numeric string.
///
/// Zero, empty and unparsable values are treated as absent.
pub fn lenient_u64(value: Option<&Value>) -> Option<u64> {
    let id = match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (id != 0).then_some(id)
}

/// Read a non-empty string field.
pub fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
