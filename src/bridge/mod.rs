//! Value bridge between JSON and the wire value tree.
//!
//! # Data Flow
//! ```text
//! Inbound request body (bytes)
//!     → inbound.rs (UTF-8 check, serde_json parse)
//!     → Value tree
//!     → inbound.rs (timestamp coercion pass, array check)
//!     → Vec<Value> call parameters
//!
//! Decoded upstream result (Value)
//!     → outbound.rs (standard JSON rendering)
//!     → JSON text for the client
//! ```
//!
//! # Design Decisions
//! - One `Value` type serves both sides of the bridge
//! - Timestamp coercion is a separate pure pass over an already parsed tree
//! - Struct keys are never coerced, only string leaves

pub mod inbound;
pub mod outbound;
pub mod value;

pub use inbound::{coerce_timestamps, parse_params, BridgeError};
pub use outbound::{to_json, to_json_text};
pub use value::Value;
