//! Upstream response validation.
//!
//! # Responsibilities
//! - Reject any status other than 200 (after draining the body)
//! - Detect responses that are not wire-protocol payloads
//! - Buffer the full payload of valid responses

use axum::http::{header, HeaderValue, Response, StatusCode};
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::ext::ReasonPhrase;

use crate::gateway::GatewayError;
use crate::upstream::error_chain;

/// Outcome of a 200 response from upstream.
#[derive(Debug)]
pub enum UpstreamReply<B> {
    /// Full wire-protocol body, ready to decode.
    Payload(Bytes),
    /// Body in some other media type; forwarded to the client untouched.
    Foreign {
        content_type: Option<HeaderValue>,
        body: B,
    },
}

/// Classify an upstream response.
pub async fn classify<B>(
    response: Response<B>,
    media_type: &str,
) -> Result<UpstreamReply<B>, GatewayError>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let (parts, body) = response.into_parts();

    if parts.status != StatusCode::OK {
        let reason = parts
            .extensions
            .get::<ReasonPhrase>()
            .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
            .or_else(|| parts.status.canonical_reason())
            .unwrap_or_default()
            .to_string();
        // drained so the connection can return to the pool
        let _ = body.collect().await;
        return Err(GatewayError::UpstreamStatus {
            status: parts.status.as_u16(),
            reason,
        });
    }

    let content_type = parts.headers.get(header::CONTENT_TYPE);
    if content_type.map(HeaderValue::as_bytes) != Some(media_type.as_bytes()) {
        return Ok(UpstreamReply::Foreign {
            content_type: content_type.cloned(),
            body,
        });
    }

    let payload = body
        .collect()
        .await
        .map_err(|e| {
            GatewayError::UpstreamTransport(format!(
                "failed to read response body: {}",
                error_chain(&e)
            ))
        })?
        .to_bytes();
    Ok(UpstreamReply::Payload(payload))
}
