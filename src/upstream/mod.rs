//! Upstream dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! encoded call (bytes)
//!     → pool.rs (POST over a pooled keep-alive connection)
//!     → response.rs (status check, content-type check, buffering)
//!     → UpstreamReply::Payload | UpstreamReply::Foreign | GatewayError
//! ```
//!
//! # Design Decisions
//! - Exactly one outbound request per call; no retries
//! - Connect failures, resets and timeouts all surface as 502
//! - Dropping the call future aborts the outbound request

pub mod pool;
pub mod response;

pub use pool::UpstreamPool;
pub use response::{classify, UpstreamReply};

/// Render an error with its whole source chain.
pub(crate) fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
