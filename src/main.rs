//! FRPC gateway
//!
//! An HTTP gateway that exposes FastRPC services to JSON clients.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client (JSON)                                               FastRPC server
//!     ─────────────▶ http ─▶ gateway ─▶ bridge ─▶ codec ─▶ upstream ─────────▶
//!     ◀───────────── http ◀─ gateway ◀─ bridge ◀─ codec ◀─ upstream ◀─────────
//!
//!     Cross-cutting: config, routing, observability, lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;

use frpc_gateway::lifecycle::{startup, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "frpc-gateway", version, about = "JSON to FastRPC gateway")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::prepare(&cli.config, cli.bind.as_deref())?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "frpc-gateway starting");

    let (server, listener) = startup::start(config).await?;

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
