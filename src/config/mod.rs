//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → endpoints handed to the resolver, the rest to the server
//! ```
//!
//! # Design Decisions
//! - Config is loaded once before serving and never changes afterwards
//! - All sections have defaults except `endpoints`
//! - A config that fails to load or validate stops the process

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    EndpointConfig, GatewayConfig, LimitsConfig, ListenerConfig, ObservabilityConfig,
    UpstreamConfig,
};
