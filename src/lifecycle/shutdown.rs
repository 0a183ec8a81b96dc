//! Shutdown coordination for the gateway.
//!
//! The server listens on this channel alongside OS signals; integration
//! tests use it to stop a gateway they started in the background.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Triggering stops the listener from accepting new calls. Calls already in
/// flight run to completion, including their upstream request.
pub struct Shutdown {
    /// Capacity 1: only the first trigger matters.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver for `GatewayServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed server to stop. A no-op when nobody listens.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
