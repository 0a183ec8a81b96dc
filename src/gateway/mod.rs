//! JSON-to-FastRPC call orchestration.
//!
//! # Data Flow
//! ```text
//! POST /<prefix>/<endpoint>  (JSON array body)
//!     → resolver (404 for unknown endpoints)
//!     → negotiation.rs (415 / 406)
//!     → buffer the whole body (413 when a limit is configured)
//!     → bridge::parse_params (400)
//!     → codec.encode_call
//!     → upstream pool (502 on transport failure or non-200)
//!     → codec.decode_response (502 on decode failure)
//!     → bridge::to_json_text → 200 application/json
//! ```
//!
//! A 200 upstream response in a foreign media type is forwarded with status
//! 502, keeping its `Content-Type` and body.

pub mod context;
pub mod error;
pub mod negotiation;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::bridge;
use crate::codec::{CallDescriptor, WireCodec};
use crate::config::LimitsConfig;
use crate::observability::metrics;
use crate::routing::EndpointResolver;
use crate::upstream::{UpstreamPool, UpstreamReply};

pub use context::{CallPhase, RequestContext};
pub use error::{ErrorClass, GatewayError};
pub use negotiation::JSON_MEDIA_TYPE;

/// Translates JSON calls into wire-protocol calls and back.
#[derive(Debug)]
pub struct Gateway {
    resolver: EndpointResolver,
    codec: Arc<dyn WireCodec>,
    upstream: UpstreamPool,
    max_body_bytes: Option<usize>,
}

impl Gateway {
    pub fn new(
        resolver: EndpointResolver,
        codec: Arc<dyn WireCodec>,
        upstream: UpstreamPool,
        limits: &LimitsConfig,
    ) -> Self {
        Self {
            resolver,
            codec,
            upstream,
            max_body_bytes: limits.max_body_bytes,
        }
    }

    /// Serve one call; always produces exactly one response.
    pub async fn handle(
        &self,
        endpoint_name: &str,
        request_id: String,
        request: Request<Body>,
    ) -> Response {
        let mut ctx = RequestContext::new(request_id, endpoint_name);

        let response = match self.process(&mut ctx, request).await {
            Ok(response) => response,
            Err(err) => {
                let class = err.class();
                if class.is_upstream() {
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        endpoint = %ctx.endpoint(),
                        class = class.as_str(),
                        phase = ctx.phase().as_str(),
                        error = %err,
                        "Upstream call failed"
                    );
                    metrics::record_upstream_error(ctx.metric_label(), class.as_str());
                } else {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        endpoint = %ctx.endpoint(),
                        class = class.as_str(),
                        phase = ctx.phase().as_str(),
                        error = %err,
                        "Request rejected"
                    );
                }
                err.into_response()
            }
        };

        ctx.finish(response.status());
        metrics::record_request(ctx.metric_label(), response.status().as_u16(), ctx.started());
        response
    }

    async fn process(
        &self,
        ctx: &mut RequestContext,
        request: Request<Body>,
    ) -> Result<Response, GatewayError> {
        let endpoint = self
            .resolver
            .resolve(ctx.endpoint())
            .ok_or_else(|| GatewayError::UnknownEndpoint(ctx.endpoint().to_string()))?;
        ctx.mark_resolved();

        let (parts, body) = request.into_parts();
        negotiation::require_json_content(&parts.headers)?;
        negotiation::require_json_accepted(&parts.headers)?;

        ctx.advance(CallPhase::AwaitingBody);
        let body = read_body(body, self.max_body_bytes).await?;
        let params = bridge::parse_params(&body)?;
        ctx.advance(CallPhase::BodyParsed);

        let call = CallDescriptor::new(endpoint.method_name.clone(), params);
        let payload = self.codec.encode_call(&call).map_err(GatewayError::Encode)?;
        ctx.advance(CallPhase::Encoded);

        tracing::debug!(
            request_id = %ctx.request_id(),
            method = %call.method_name,
            host = %endpoint.hostname,
            port = endpoint.port,
            path = %endpoint.path,
            payload_bytes = payload.len(),
            "Dispatching call"
        );
        ctx.advance(CallPhase::UpstreamPending);

        let reply = match self
            .upstream
            .call(&endpoint, self.codec.media_type(), payload)
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                ctx.advance(match err {
                    GatewayError::UpstreamStatus { .. } => CallPhase::UpstreamBadStatus,
                    _ => CallPhase::UpstreamTransportFailed,
                });
                return Err(err);
            }
        };

        match reply {
            UpstreamReply::Foreign { content_type, body } => {
                ctx.advance(CallPhase::UpstreamBadContentType);
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    endpoint = %ctx.endpoint(),
                    content_type = ?content_type,
                    "Upstream answered with a foreign content type"
                );
                metrics::record_upstream_error(ctx.metric_label(), ErrorClass::UpstreamProtocol.as_str());

                let mut response = Response::new(Body::new(body));
                *response.status_mut() = StatusCode::BAD_GATEWAY;
                if let Some(content_type) = content_type {
                    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
                }
                Ok(response)
            }
            UpstreamReply::Payload(bytes) => match self.codec.decode_response(&bytes) {
                Ok(value) => {
                    ctx.advance(CallPhase::UpstreamOk);
                    Ok((
                        [(header::CONTENT_TYPE, JSON_MEDIA_TYPE)],
                        bridge::to_json_text(&value),
                    )
                        .into_response())
                }
                Err(err) => {
                    ctx.advance(CallPhase::UpstreamDecodeFailed);
                    Err(GatewayError::UpstreamDecode(err))
                }
            },
        }
    }
}

/// Buffer the complete inbound body.
async fn read_body(body: Body, limit: Option<usize>) -> Result<Bytes, GatewayError> {
    match limit {
        Some(limit) => Limited::new(body, limit)
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    GatewayError::PayloadTooLarge(limit)
                } else {
                    GatewayError::BodyRead(e.to_string())
                }
            }),
        None => body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|e| GatewayError::BodyRead(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_body_unbounded() {
        let body = Body::from(vec![b'x'; 64 * 1024]);
        assert_eq!(read_body(body, None).await.unwrap().len(), 64 * 1024);
    }

    #[tokio::test]
    async fn test_read_body_limit() {
        let err = read_body(Body::from("[1,2,3]"), Some(4)).await.unwrap_err();
        assert!(matches!(err, GatewayError::PayloadTooLarge(4)));
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let ok = read_body(Body::from("[1]"), Some(4)).await.unwrap();
        assert_eq!(&ok[..], b"[1]");
    }
}
