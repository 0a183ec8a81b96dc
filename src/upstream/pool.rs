//! Outbound connection pool.
//!
//! # Responsibilities
//! - Own the keep-alive client shared by every call
//! - Build the wire-protocol POST for one endpoint
//! - Fold transport failures and timeouts into upstream transport errors

use std::time::Duration;

use axum::http::{header, Method, Request, Response, Uri};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{EndpointConfig, UpstreamConfig};
use crate::gateway::GatewayError;
use crate::upstream::error_chain;
use crate::upstream::response::{classify, UpstreamReply};

/// Pooled HTTP client for upstream RPC servers.
///
/// Created once at startup; connections are reused across calls to the same
/// host and port.
#[derive(Clone, Debug)]
pub struct UpstreamPool {
    client: Client<HttpConnector, Full<Bytes>>,
    request_timeout: Option<Duration>,
}

impl UpstreamPool {
    pub fn new(config: &UpstreamConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(config.connect_timeout_secs.map(Duration::from_secs));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build(connector);

        Self {
            client,
            request_timeout: config.request_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Send one call and validate the response.
    pub async fn call(
        &self,
        endpoint: &EndpointConfig,
        media_type: &'static str,
        payload: Bytes,
    ) -> Result<UpstreamReply<Incoming>, GatewayError> {
        let exchange = async {
            let response = self.dispatch(endpoint, media_type, payload).await?;
            classify(response, media_type).await
        };

        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange).await.map_err(|_| {
                GatewayError::UpstreamTransport(format!(
                    "no response within {} seconds",
                    limit.as_secs()
                ))
            })?,
            None => exchange.await,
        }
    }

    /// Issue the POST; the body length is always known up front.
    pub async fn dispatch(
        &self,
        endpoint: &EndpointConfig,
        media_type: &'static str,
        payload: Bytes,
    ) -> Result<Response<Incoming>, GatewayError> {
        let request = build_request(endpoint, media_type, payload)?;
        self.client
            .request(request)
            .await
            .map_err(|e| GatewayError::UpstreamTransport(error_chain(&e)))
    }
}

/// `http://host:port/path` for an endpoint; IPv6 literals get brackets.
pub fn upstream_uri(endpoint: &EndpointConfig) -> Result<Uri, GatewayError> {
    let host = if endpoint.hostname.contains(':') && !endpoint.hostname.starts_with('[') {
        format!("[{}]", endpoint.hostname)
    } else {
        endpoint.hostname.clone()
    };
    format!("http://{}:{}{}", host, endpoint.port, endpoint.path)
        .parse()
        .map_err(|e| GatewayError::UpstreamTransport(format!("invalid upstream address: {}", e)))
}

fn build_request(
    endpoint: &EndpointConfig,
    media_type: &'static str,
    payload: Bytes,
) -> Result<Request<Full<Bytes>>, GatewayError> {
    Request::builder()
        .method(Method::POST)
        .uri(upstream_uri(endpoint)?)
        .header(header::CONTENT_TYPE, media_type)
        .header(header::ACCEPT, media_type)
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Full::new(payload))
        .map_err(|e| GatewayError::UpstreamTransport(format!("invalid upstream request: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(hostname: &str) -> EndpointConfig {
        EndpointConfig {
            hostname: hostname.into(),
            port: 8080,
            path: "/RPC2".into(),
            method_name: "search.query".into(),
        }
    }

    #[test]
    fn test_upstream_uri() {
        assert_eq!(
            upstream_uri(&endpoint("backend.local")).unwrap(),
            "http://backend.local:8080/RPC2"
        );
        assert_eq!(upstream_uri(&endpoint("::1")).unwrap(), "http://[::1]:8080/RPC2");
        assert!(upstream_uri(&endpoint("bad host")).is_err());
    }

    #[test]
    fn test_request_headers() {
        let payload = Bytes::from_static(b"\xca\x11\x02\x01\x68\x00");
        let request = build_request(&endpoint("localhost"), "application/x-frpc", payload).unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/x-frpc");
        assert_eq!(request.headers()[header::ACCEPT], "application/x-frpc");
        assert_eq!(request.headers()[header::CONTENT_LENGTH], "6");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let pool = UpstreamPool::new(&UpstreamConfig::default());
        let mut target = endpoint("127.0.0.1");
        target.port = port;

        let err = pool
            .call(&target, "application/x-frpc", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamTransport(_)));
        assert_eq!(err.status(), axum::http::StatusCode::BAD_GATEWAY);
    }
}
