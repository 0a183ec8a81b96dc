//! JSON to FastRPC gateway library.
//!
//! Accepts JSON-array calls over HTTP, forwards them to FastRPC upstreams
//! as binary `application/x-frpc` calls and translates the replies back
//! into JSON.

pub mod bridge;
pub mod codec;
pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::GatewayConfig;
pub use gateway::Gateway;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
