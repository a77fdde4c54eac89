//! A scoped, ordered view of a tenant channel.

use crate::scope::Scope;
use portal_core::{RequestChange, ServiceRequest};
use std::collections::HashMap;
use telemetry::metrics;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;
use uuid::Uuid;

/// What a subscriber observes next.
#[derive(Debug)]
pub enum SubscriptionEvent {
    Change(RequestChange),
    /// Events were missed; the subscriber must resync from the store.
    Lagged(u64),
    /// The bus went away.
    Closed,
}

/// Receiver side of one observer.
///
/// Filters the tenant stream down to its scope and never yields a change
/// whose revision is at or below the last one it yielded for that request.
#[derive(Debug)]
pub struct Subscription {
    scope: Scope,
    rx: broadcast::Receiver<RequestChange>,
    seen: HashMap<Uuid, u64>,
}

impl Subscription {
    pub(crate) fn new(scope: Scope, rx: broadcast::Receiver<RequestChange>) -> Self {
        metrics().active_subscribers.inc();
        Self {
            scope,
            rx,
            seen: HashMap::new(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Records the revisions of a fresh snapshot so that older buffered
    /// events are skipped.
    pub fn prime(&mut self, snapshot: &[ServiceRequest]) {
        for request in snapshot {
            let seen = self.seen.entry(request.id).or_insert(0);
            *seen = (*seen).max(request.revision);
        }
    }

    /// Waits for the next relevant event.
    pub async fn next(&mut self) -> SubscriptionEvent {
        loop {
            match self.rx.recv().await {
                Ok(change) => {
                    if let Some(change) = self.admit(change) {
                        return SubscriptionEvent::Change(change);
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(scope = ?self.scope, missed, "Subscriber lagged");
                    return SubscriptionEvent::Lagged(missed);
                }
                Err(RecvError::Closed) => return SubscriptionEvent::Closed,
            }
        }
    }

    /// Non-blocking variant of [`next`](Self::next). `None` when nothing is
    /// buffered.
    pub fn try_next(&mut self) -> Option<SubscriptionEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(change) => {
                    if let Some(change) = self.admit(change) {
                        return Some(SubscriptionEvent::Change(change));
                    }
                }
                Err(TryRecvError::Lagged(missed)) => return Some(SubscriptionEvent::Lagged(missed)),
                Err(TryRecvError::Closed) => return Some(SubscriptionEvent::Closed),
                Err(TryRecvError::Empty) => return None,
            }
        }
    }

    fn admit(&mut self, change: RequestChange) -> Option<RequestChange> {
        if !self.scope.matches(&change.request) {
            return None;
        }
        let last = self.seen.entry(change.request.id).or_insert(0);
        if change.request.revision <= *last {
            return None;
        }
        *last = change.request.revision;
        Some(change)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        metrics().active_subscribers.dec();
    }
}
