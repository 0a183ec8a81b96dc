//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports non-zero, paths absolute)
//! - Check method names fit the wire format
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::codec::types::MAX_NAME_LEN;
use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no endpoints configured")]
    NoEndpoints,

    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("route prefix '{0}' must be a single non-empty path segment")]
    RoutePrefix(String),

    #[error("endpoint '{0}': hostname is empty")]
    EmptyHostname(String),

    #[error("endpoint '{0}': port must be non-zero")]
    ZeroPort(String),

    #[error("endpoint '{name}': path '{path}' must start with '/'")]
    RelativePath { name: String, path: String },

    #[error("endpoint '{0}': method name is empty")]
    EmptyMethod(String),

    #[error("endpoint '{name}': method name of {len} bytes exceeds {max}")]
    MethodTooLong { name: String, len: usize, max: usize },

    #[error("endpoint name '{0}' is not usable in a URL path")]
    EndpointName(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let prefix = &config.listener.route_prefix;
    if prefix.is_empty() || prefix.contains(['/', '{', '}']) {
        errors.push(ValidationError::RoutePrefix(prefix.clone()));
    }

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    for (name, endpoint) in &config.endpoints {
        if name.is_empty() || name.starts_with('/') {
            errors.push(ValidationError::EndpointName(name.clone()));
        }
        if endpoint.hostname.trim().is_empty() {
            errors.push(ValidationError::EmptyHostname(name.clone()));
        }
        if endpoint.port == 0 {
            errors.push(ValidationError::ZeroPort(name.clone()));
        }
        if !endpoint.path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                name: name.clone(),
                path: endpoint.path.clone(),
            });
        }
        if endpoint.method_name.is_empty() {
            errors.push(ValidationError::EmptyMethod(name.clone()));
        } else if endpoint.method_name.len() > MAX_NAME_LEN {
            errors.push(ValidationError::MethodTooLong {
                name: name.clone(),
                len: endpoint.method_name.len(),
                max: MAX_NAME_LEN,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
