//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! POST /<prefix>/<endpointName>
//!     → axum route captures endpointName (may contain '/')
//!     → resolver.rs (name lookup)
//!     → Return: EndpointConfig or unknown endpoint (404)
//!
//! Resolver construction (at startup):
//!     validated endpoints map
//!     → Freeze as immutable EndpointResolver
//! ```

pub mod resolver;

pub use resolver::EndpointResolver;
