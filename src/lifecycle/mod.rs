//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Metrics → Bind listener → Serve
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Signal or trigger → Stop accepting → Drain in-flight calls → Exit
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
