//! Gateway error taxonomy and its HTTP mapping.
//!
//! Every per-request failure becomes exactly one plain-text response. Nothing
//! here is retried and nothing outlives the call that raised it.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::bridge::BridgeError;
use crate::codec::CodecError;

/// Coarse error class, used for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    ClientRequest,
    Routing,
    UpstreamTransport,
    UpstreamProtocol,
    CodecDecode,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::ClientRequest => "client_request",
            ErrorClass::Routing => "routing",
            ErrorClass::UpstreamTransport => "upstream_transport",
            ErrorClass::UpstreamProtocol => "upstream_protocol",
            ErrorClass::CodecDecode => "codec_decode",
        }
    }

    /// Errors caused by the upstream side rather than the client.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ErrorClass::UpstreamTransport | ErrorClass::UpstreamProtocol | ErrorClass::CodecDecode
        )
    }
}

/// Errors that end a single proxied call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown proxy endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("application/json request content required")]
    UnsupportedMediaType,

    #[error("only application/json response available")]
    NotAcceptable,

    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("request body is not a valid JSON: {0}")]
    MalformedJson(String),

    #[error("parameter array required")]
    NotAnArray,

    #[error("request parameters cannot be encoded: {0}")]
    Encode(CodecError),

    /// Connect refused, reset, DNS failure or timeout. Timeouts are not
    /// reported as 504.
    #[error("request to upstream server failed: {0}")]
    UpstreamTransport(String),

    #[error("error received from upstream server: {status} {reason}")]
    UpstreamStatus { status: u16, reason: String },

    #[error("invalid response from upstream: {0}")]
    UpstreamDecode(CodecError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::UnknownEndpoint(_) => StatusCode::NOT_FOUND,
            GatewayError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            GatewayError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::BodyRead(_)
            | GatewayError::MalformedJson(_)
            | GatewayError::NotAnArray
            | GatewayError::Encode(_) => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamTransport(_)
            | GatewayError::UpstreamStatus { .. }
            | GatewayError::UpstreamDecode(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            GatewayError::UnknownEndpoint(_) => ErrorClass::Routing,
            GatewayError::UpstreamTransport(_) => ErrorClass::UpstreamTransport,
            GatewayError::UpstreamStatus { .. } => ErrorClass::UpstreamProtocol,
            GatewayError::UpstreamDecode(_) => ErrorClass::CodecDecode,
            _ => ErrorClass::ClientRequest,
        }
    }
}

impl From<BridgeError> for GatewayError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::NotAnArray(_) => GatewayError::NotAnArray,
            other => GatewayError::MalformedJson(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", self),
        )
            .into_response()
    }
}
