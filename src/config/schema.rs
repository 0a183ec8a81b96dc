//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, route prefix).
    pub listener: ListenerConfig,

    /// Outbound connection pool settings.
    pub upstream: UpstreamConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Proxy endpoints keyed by the name clients use in the URL.
    pub endpoints: BTreeMap<String, EndpointConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// First path segment of proxy routes: `POST /<route_prefix>/<endpoint>`.
    pub route_prefix: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            route_prefix: "frpcproxy".to_string(),
        }
    }
}

/// Upstream endpoint: where one proxy route sends its calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub hostname: String,

    pub port: u16,

    /// HTTP path of the upstream RPC handler (e.g., "/RPC2").
    pub path: String,

    /// Remote method invoked for every call on this endpoint.
    #[serde(rename = "method", alias = "method_name")]
    pub method_name: String,
}

/// Outbound connection pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,

    /// Whole-call timeout (send + full response) in seconds.
    pub request_timeout_secs: Option<u64>,

    /// How long an idle keep-alive connection stays pooled.
    pub pool_idle_timeout_secs: u64,

    /// Maximum idle connections kept per upstream host.
    pub pool_max_idle_per_host: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: None,
            request_timeout_secs: None,
            pool_idle_timeout_secs: 90,
            pool_max_idle_per_host: 32,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes; unbounded when absent.
    pub max_body_bytes: Option<usize>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
