//! Content negotiation for inbound calls.
//!
//! # Design Decisions
//! - `Content-Type` must be exactly `application/json`, parameters included
//! - `Accept` follows the usual media-range rules: absent means anything,
//!   `q=0` excludes a range, unparsable entries are skipped
//! - Wildcards apply to type and subtype independently (`*/json` matches);
//!   a range with parameters other than `q` never matches

use std::str::FromStr;

use axum::http::{header, HeaderMap};
use mime::Mime;

use crate::gateway::error::GatewayError;

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Reject requests whose body is not declared as JSON.
pub fn require_json_content(headers: &HeaderMap) -> Result<(), GatewayError> {
    match headers.get(header::CONTENT_TYPE) {
        Some(value) if value.as_bytes() == JSON_MEDIA_TYPE.as_bytes() => Ok(()),
        _ => Err(GatewayError::UnsupportedMediaType),
    }
}

/// Reject requests that cannot take a JSON response.
pub fn require_json_accepted(headers: &HeaderMap) -> Result<(), GatewayError> {
    if accepts_json(headers) {
        Ok(())
    } else {
        Err(GatewayError::NotAcceptable)
    }
}

/// Whether the `Accept` headers admit `application/json`.
pub fn accepts_json(headers: &HeaderMap) -> bool {
    let ranges: Vec<&str> = headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|range| !range.is_empty())
        .collect();

    if ranges.is_empty() {
        return true;
    }

    ranges
        .into_iter()
        .filter_map(|range| Mime::from_str(range).ok())
        .any(|range| admits_json(&range))
}

fn admits_json(range: &Mime) -> bool {
    let quality = range
        .get_param("q")
        .and_then(|q| q.as_str().parse::<f32>().ok())
        .unwrap_or(1.0);
    if quality <= 0.0 {
        return false;
    }

    // The offered type carries no parameters, so any other parameter on the
    // range fails to match it.
    if range
        .params()
        .any(|(name, _)| !name.as_str().eq_ignore_ascii_case("q"))
    {
        return false;
    }

    let (kind, subtype) = (range.type_(), range.subtype());
    (kind == mime::STAR || kind == mime::APPLICATION)
        && (subtype == mime::STAR || subtype == mime::JSON)
}
