//! Per-tenant change fan-out.

use crate::scope::Scope;
use crate::subscription::Subscription;
use parking_lot::RwLock;
use portal_core::{Error, RequestChange, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use telemetry::metrics;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

/// Default buffer capacity for each tenant channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out of request changes.
///
/// Each tenant gets its own broadcast channel, so an event can only ever
/// reach subscribers of the tenant it belongs to. Publishing never blocks
/// and never fails the write that produced the change.
pub struct ChangeBus {
    channels: RwLock<HashMap<Uuid, broadcast::Sender<RequestChange>>>,
    capacity: usize,
    closed: AtomicBool,
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Publish a change to the subscribers of its tenant.
    ///
    /// Returns how many receivers it was handed to. Zero receivers, or a
    /// closed bus, simply drops the event.
    pub fn publish(&self, change: RequestChange) -> usize {
        if self.is_closed() {
            metrics().events_dropped.inc();
            return 0;
        }

        let tenant_id = change.tenant_id();
        let sender = self.channels.read().get(&tenant_id).cloned();
        let delivered = sender
            .map(|tx| tx.send(change).unwrap_or(0))
            .unwrap_or(0);

        metrics().events_published.inc();
        debug!(tenant_id = %tenant_id, receivers = delivered, "Published request change");
        delivered
    }

    /// Subscribe to a tenant's changes, filtered to `scope`.
    pub fn subscribe(&self, scope: Scope) -> Result<Subscription> {
        if self.is_closed() {
            return Err(Error::channel_unavailable("change bus is closed"));
        }

        let tenant_id = scope.tenant_id();
        if let Some(tx) = self.channels.read().get(&tenant_id) {
            return Ok(Subscription::new(scope, tx.subscribe()));
        }

        let mut channels = self.channels.write();
        let tx = channels
            .entry(tenant_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(Subscription::new(scope, tx.subscribe()))
    }

    /// Live receivers on a tenant's channel.
    pub fn subscriber_count(&self, tenant_id: Uuid) -> usize {
        self.channels
            .read()
            .get(&tenant_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Drops channels nobody listens to. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut channels = self.channels.write();
        let before = channels.len();
        channels.retain(|_, tx| tx.receiver_count() > 0);
        before - channels.len()
    }

    /// Ends every subscription and refuses new ones until [`reopen`](Self::reopen).
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let dropped = std::mem::take(&mut *self.channels.write());
        info!(tenants = dropped.len(), "Change bus closed");
    }

    pub fn reopen(&self) {
        if self.closed.swap(false, Ordering::AcqRel) {
            info!("Change bus reopened");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
