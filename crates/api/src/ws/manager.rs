//! Registry of open WebSocket streams.

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use realtime::Scope;
use std::collections::HashMap;
use telemetry::metrics;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::Sender<Message>;

/// Outbound frames buffered per connection before the stream counts as
/// behind.
pub const OUTBOUND_QUEUE: usize = 64;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    pub scope: Scope,
    /// Outbound frames for this connection.
    pub sender: WsSender,
    pub connected_at: DateTime<Utc>,
}

/// Manages all active WebSocket connections.
///
/// Shared through `Arc`; the lock is never held across an await point.
pub struct ConnectionManager {
    connections: RwLock<HashMap<Uuid, WsConnection>>,
    queue_capacity: usize,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::with_queue_capacity(OUTBOUND_QUEUE)
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Registers a connection. Returns its id, a bounded sender for
    /// outbound frames, and the receiver the socket writer drains.
    pub fn add(&self, scope: Scope) -> (Uuid, WsSender, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let conn_id = Uuid::new_v4();
        let mut conns = self.connections.write();
        conns.insert(
            conn_id,
            WsConnection {
                scope,
                sender: tx.clone(),
                connected_at: Utc::now(),
            },
        );
        metrics().ws_connections.set(conns.len() as u64);
        (conn_id, tx, rx)
    }

    pub fn remove(&self, conn_id: Uuid) {
        let mut conns = self.connections.write();
        conns.remove(&conn_id);
        metrics().ws_connections.set(conns.len() as u64);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }

    pub fn count_for_tenant(&self, tenant_id: Uuid) -> usize {
        self.connections
            .read()
            .values()
            .filter(|c| c.scope.tenant_id() == tenant_id)
            .count()
    }

    /// Queue a Ping frame for every connected client. Returns how many
    /// accepted it; a connection with a full queue is skipped.
    pub fn ping_all(&self) -> usize {
        self.connections
            .read()
            .values()
            .filter(|c| c.sender.try_send(Message::Ping(Vec::new())).is_ok())
            .count()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub fn shutdown_all(&self) {
        let mut conns = self.connections.write();
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.try_send(Message::Close(None));
        }
        conns.clear();
        metrics().ws_connections.set(0);
        info!(count, "Closed all WebSocket connections");
    }
}
