//! WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ws::manager::ConnectionManager;

/// Pings every open stream on `interval` until cancelled.
pub async fn run_heartbeat(
    manager: Arc<ConnectionManager>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let count = manager.ping_all();
                debug!(count, "WebSocket heartbeat ping");
            }
        }
    }
}
