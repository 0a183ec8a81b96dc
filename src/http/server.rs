//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy route
//! - Wire up middleware (tracing, request ID)
//! - Own the gateway and its upstream pool for the process lifetime
//! - Serve until shutdown, draining in-flight calls

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::Request,
    response::Response,
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::codec::FrpcCodec;
use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::signals::shutdown_signal;
use crate::routing::EndpointResolver;
use crate::upstream::UpstreamPool;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let resolver = EndpointResolver::from_config(config.endpoints.clone());
        tracing::info!(endpoints = ?resolver.names(), "Endpoints registered");

        let gateway = Gateway::new(
            resolver,
            Arc::new(FrpcCodec::new()),
            UpstreamPool::new(&config.upstream),
            &config.limits,
        );

        let state = AppState {
            gateway: Arc::new(gateway),
        };
        let router = build_router(&config.listener.route_prefix, state);
        Self { router, config }
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve until Ctrl+C, SIGTERM or the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            route = %format!("/{}/{{endpoint}}", self.config.listener.route_prefix),
            "FRPC gateway listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => {},
                    _ = shutdown_signal() => {},
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(route_prefix: &str, state: AppState) -> Router {
    Router::new()
        .route(&format!("/{}/{{*endpoint}}", route_prefix), post(proxy_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone())),
        )
}

/// Proxy handler: one inbound call, one upstream call.
async fn proxy_handler(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    request: Request<Body>,
) -> Response {
    let request_id = request_id(request.headers());
    state.gateway.handle(&endpoint, request_id, request).await
}
