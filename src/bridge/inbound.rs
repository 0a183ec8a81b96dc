//! Inbound JSON parsing with timestamp coercion.
//!
//! # Responsibilities
//! - Decode the buffered request body as UTF-8 JSON
//! - Replace date-time string leaves with timestamps when calendar-valid
//! - Require the top-level value to be the parameter array

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use regex::Regex;
use thiserror::Error;

use crate::bridge::value::Value;

/// Strings of exactly this shape are timestamp candidates.
static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}Z$")
        .expect("timestamp pattern is a valid regex")
});

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Errors raised while turning a request body into call parameters.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("body is not valid UTF-8")]
    InvalidUtf8,

    #[error("{0}")]
    Syntax(#[from] serde_json::Error),

    #[error("top-level value is {0}, not an array")]
    NotAnArray(&'static str),
}

/// Parse a request body into the call parameter list.
pub fn parse_params(body: &[u8]) -> Result<Vec<Value>, BridgeError> {
    let text = std::str::from_utf8(body).map_err(|_| BridgeError::InvalidUtf8)?;
    let json: serde_json::Value = serde_json::from_str(text)?;

    match coerce_timestamps(Value::from(json)) {
        Value::Array(params) => Ok(params),
        other => Err(BridgeError::NotAnArray(other.kind())),
    }
}

/// Replace every qualifying string leaf with a timestamp.
///
/// Strings that match the pattern but do not name a real calendar instant
/// (month 13, February 30th, second 60, hour 24) stay strings.
pub fn coerce_timestamps(value: Value) -> Value {
    match value {
        Value::String(s) => match parse_timestamp(&s) {
            Some(ts) => Value::Timestamp(ts),
            None => Value::String(s),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_timestamps).collect()),
        Value::Struct(members) => Value::Struct(
            members
                .into_iter()
                .map(|(key, value)| (key, coerce_timestamps(value)))
                .collect(),
        ),
        other => other,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if !TIMESTAMP_PATTERN.is_match(s) {
        return None;
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        // chrono keeps `:60` as a leap second; the wire format cannot carry it
        .filter(|naive| naive.nanosecond() < 1_000_000_000)
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_valid_timestamp_is_coerced() {
        let value = coerce_timestamps(Value::String("2024-03-05T12:00:00.000Z".into()));
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(value, Value::Timestamp(expected));
    }

    #[test]
    fn test_milliseconds_are_kept() {
        let value = coerce_timestamps(Value::String("2024-03-05T12:00:00.250Z".into()));
        let Value::Timestamp(ts) = value else {
            panic!("expected timestamp");
        };
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_invalid_calendar_date_stays_string() {
        let raw = "2024-13-40T12:00:00.000Z";
        assert_eq!(
            coerce_timestamps(Value::String(raw.into())),
            Value::String(raw.into())
        );
        let feb = "2023-02-30T00:00:00.000Z";
        assert_eq!(
            coerce_timestamps(Value::String(feb.into())),
            Value::String(feb.into())
        );
        for raw in ["2024-03-05T23:59:60.000Z", "2016-12-31T23:59:60.999Z", "2024-03-05T24:00:00.000Z"] {
            assert_eq!(
                coerce_timestamps(Value::String(raw.into())),
                Value::String(raw.into()),
                "{raw} must stay a string"
            );
        }
    }

    #[test]
    fn test_near_miss_patterns_untouched() {
        for raw in [
            "2024-03-05T12:00:00Z",
            "2024-03-05T12:00:00.000+01:00",
            "2024-03-05 12:00:00.000Z",
            " 2024-03-05T12:00:00.000Z",
            "2024-03-05T12:00:00.0000Z",
            "hello",
        ] {
            assert_eq!(
                coerce_timestamps(Value::String(raw.into())),
                Value::String(raw.into()),
                "{raw} must not be coerced"
            );
        }
    }

    #[test]
    fn test_coercion_reaches_nested_leaves_but_not_keys() {
        let key = "2024-03-05T12:00:00.000Z";
        let params = parse_params(
            br#"[{"2024-03-05T12:00:00.000Z": ["2024-03-05T12:00:00.000Z"]}]"#,
        )
        .unwrap();
        let Value::Struct(members) = &params[0] else {
            panic!("expected struct");
        };
        let Value::Array(items) = &members[key] else {
            panic!("expected array under the date-like key");
        };
        assert!(matches!(items[0], Value::Timestamp(_)));
    }

    #[test]
    fn test_parse_params_accepts_array() {
        let params = parse_params(br#"[1, "two", 3.5, true, null]"#).unwrap();
        assert_eq!(
            params,
            vec![
                Value::Integer(1),
                Value::String("two".into()),
                Value::Double(3.5),
                Value::Bool(true),
                Value::Null,
            ]
        );
    }

    #[test]
    fn test_parse_params_rejects_non_array() {
        assert!(matches!(
            parse_params(b"{}"),
            Err(BridgeError::NotAnArray("struct"))
        ));
        assert!(matches!(
            parse_params(b"\"2024-03-05T12:00:00.000Z\""),
            Err(BridgeError::NotAnArray("timestamp"))
        ));
    }

    #[test]
    fn test_parse_params_rejects_malformed() {
        assert!(matches!(parse_params(b"not json"), Err(BridgeError::Syntax(_))));
        assert!(matches!(parse_params(b""), Err(BridgeError::Syntax(_))));
        assert!(matches!(
            parse_params(&[b'[', 0xff, b']']),
            Err(BridgeError::InvalidUtf8)
        ));
    }
}
