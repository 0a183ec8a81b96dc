//! Outbound rendering of decoded results as JSON.

use chrono::SecondsFormat;

use crate::bridge::value::Value;

/// Render a value the way standard JSON stringification would.
///
/// Timestamps become ISO-8601 strings with millisecond precision, binary
/// payloads become arrays of byte values and non-finite doubles become `null`.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Double(d) => serde_json::Number::from_f64(*d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Timestamp(ts) => {
            serde_json::Value::String(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        Value::Binary(bytes) => {
            serde_json::Value::Array(bytes.iter().map(|b| serde_json::Value::from(*b)).collect())
        }
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Struct(members) => serde_json::Value::Object(
            members
                .iter()
                .map(|(key, value)| (key.clone(), to_json(value)))
                .collect(),
        ),
    }
}

/// Serialize a value to compact JSON text.
pub fn to_json_text(value: &Value) -> String {
    to_json(value).to_string()
}
