use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Read a displayable message out of an arbitrary JSON value.
///
/// Strings are used as-is, arrays of strings (validation-style error bodies)
/// are joined. Anything else, or an empty result, yields `None`.
pub fn message_from_value(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    Some(sanitize(raw)).filter(|s| !s.is_empty())
}

/// Read an HTTP status out of a `statusCode` field, ignoring zero and out-of-range values.
pub fn status_from_value(value: &Value) -> Option<u16> {
    value
        .get("statusCode")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .filter(|code| (100..=999).contains(code))
}

/// Strip control characters before a message reaches a log line or a terminal.
pub fn sanitize(s: String) -> String {
    if s.chars().any(char::is_control) {
        s.chars().filter(|c| !c.is_control()).collect()
    } else {
        s
    }
}

/// Accept identifiers sent either as JSON strings or JSON numbers.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or number identifier, got {}",
            other
        ))),
    }
}
