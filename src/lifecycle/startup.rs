//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize metrics when enabled
//! - Bind the listener last (traffic only when ready)
//!
//! # Design Decisions
//! - Fail fast: a missing or invalid endpoint configuration is fatal

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, GatewayConfig};
use crate::http::GatewayServer;
use crate::observability::{logging, metrics};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// Load the configuration, install logging and apply CLI overrides.
pub fn prepare(config_path: &Path, bind_override: Option<&str>) -> Result<GatewayConfig, StartupError> {
    let loaded = load_config(config_path);
    let level = loaded
        .as_ref()
        .map(|config| config.observability.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    logging::init_tracing(&level);

    let mut config = loaded.inspect_err(|e| {
        tracing::error!(path = %config_path.display(), error = %e, "Failed to load configuration");
    })?;

    if let Some(bind) = bind_override {
        config.listener.bind_address = bind.to_string();
    }
    Ok(config)
}

/// Build the server and bind its listener.
pub async fn start(config: GatewayConfig) -> Result<(GatewayServer, TcpListener), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        route_prefix = %config.listener.route_prefix,
        endpoints = config.endpoints.len(),
        max_body_bytes = ?config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let server = GatewayServer::new(config);
    Ok((server, listener))
}
