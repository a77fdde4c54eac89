//! Observer-side synchronization: a local cache kept converged with the
//! store across channel outages.

use crate::backoff::{next_delay, ReconnectConfig};
use crate::bus::ChangeBus;
use crate::scope::Scope;
use crate::subscription::{Subscription, SubscriptionEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_core::{Result, ServiceRequest};
use request_store::RequestStore;
use std::sync::Arc;
use telemetry::metrics;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Full listing for a scope. Used for resync and for polling while the
/// channel is down.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self, scope: &Scope) -> Result<Vec<ServiceRequest>>;
}

#[async_trait]
impl<T: RequestStore + ?Sized> SnapshotSource for T {
    async fn snapshot(&self, scope: &Scope) -> Result<Vec<ServiceRequest>> {
        match scope {
            Scope::Guest { session_id, .. } => self.list_for_session(*session_id).await,
            Scope::Staff { tenant_id } => self.list_for_tenant(*tenant_id).await,
        }
    }
}

/// What an observer renders.
///
/// `channel_connected` and `data_is_fresh` move independently: cached data
/// can be fresh from a poll while the channel is down, and the channel can
/// be up while a resync is failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Newest first.
    pub requests: Vec<ServiceRequest>,
    pub channel_connected: bool,
    pub data_is_fresh: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl ViewState {
    fn replace(&mut self, snapshot: Vec<ServiceRequest>) {
        self.requests = snapshot;
        self.data_is_fresh = true;
        self.last_synced_at = Some(Utc::now());
    }

    /// Upserts one request, keeping newest-first order. A new arrival goes
    /// ahead of any request with the same `created_at`, as the store's
    /// insertion-sequence tiebreak would place it.
    fn apply(&mut self, request: ServiceRequest) {
        match self.requests.iter_mut().find(|r| r.id == request.id) {
            Some(existing) if existing.revision < request.revision => *existing = request,
            Some(_) => {}
            None => {
                let at = self
                    .requests
                    .iter()
                    .position(|r| r.created_at <= request.created_at)
                    .unwrap_or(self.requests.len());
                self.requests.insert(at, request);
            }
        }
    }

    pub fn get(&self, id: uuid::Uuid) -> Option<&ServiceRequest> {
        self.requests.iter().find(|r| r.id == id)
    }
}

/// Starts observer tasks.
pub struct SyncedView;

impl SyncedView {
    /// Spawns an observer for `scope`. The first state published is empty
    /// and disconnected; the task resyncs immediately.
    pub fn spawn<S>(
        source: Arc<S>,
        bus: Arc<ChangeBus>,
        scope: Scope,
        reconnect: ReconnectConfig,
    ) -> SyncHandle
    where
        S: SnapshotSource + ?Sized + 'static,
    {
        let (tx, rx) = watch::channel(ViewState::default());
        let cancel = CancellationToken::new();
        let observer = Observer {
            source,
            bus,
            scope,
            reconnect,
            state: tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(observer.run());
        SyncHandle {
            state: rx,
            cancel,
            task: Some(task),
        }
    }
}

/// Owner of a running observer. Dropping it cancels the task.
pub struct SyncHandle {
    state: watch::Receiver<ViewState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Current state.
    pub fn current(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// A receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Waits until `predicate` holds for the published state.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Option<ViewState>
    where
        F: FnMut(&ViewState) -> bool,
    {
        self.state.wait_for(predicate).await.ok().map(|s| s.clone())
    }

    /// Cancels the observer and waits for it to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Observer<S: ?Sized> {
    source: Arc<S>,
    bus: Arc<ChangeBus>,
    scope: Scope,
    reconnect: ReconnectConfig,
    state: watch::Sender<ViewState>,
    cancel: CancellationToken,
}

impl<S: SnapshotSource + ?Sized> Observer<S> {
    async fn run(self) {
        let mut delay = self.reconnect.initial_delay;

        while !self.cancel.is_cancelled() {
            match self.bus.subscribe(self.scope) {
                Ok(mut sub) => {
                    if self.resync(&mut sub).await {
                        self.set_connected(true);
                        delay = self.reconnect.initial_delay;
                        info!(scope = ?self.scope, "Observer connected");
                        if !self.tail(&mut sub).await {
                            return;
                        }
                    }
                    self.set_connected(false);
                }
                Err(e) => {
                    debug!(scope = ?self.scope, error = %e, "Channel unavailable");
                    self.set_connected(false);
                }
            }

            // Serve from cache, refreshed by polling, until the channel returns.
            self.poll().await;
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = next_delay(delay, &self.reconnect);
        }
        debug!(scope = ?self.scope, "Observer stopped");
    }

    /// Follows the channel until it closes or a lag resync fails (`true`),
    /// or the observer is cancelled (`false`).
    async fn tail(&self, sub: &mut Subscription) -> bool {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return false,
                event = sub.next() => match event {
                    SubscriptionEvent::Change(change) => {
                        self.state.send_modify(|s| s.apply(change.request));
                    }
                    SubscriptionEvent::Lagged(missed) => {
                        metrics().resyncs.inc();
                        debug!(scope = ?self.scope, missed, "Resyncing after lag");
                        if !self.resync(sub).await {
                            // Gap not filled; drop the subscription and poll.
                            return true;
                        }
                    }
                    SubscriptionEvent::Closed => {
                        warn!(scope = ?self.scope, "Channel closed, falling back to polling");
                        return true;
                    }
                },
            }
        }
    }

    /// Full listing. Returns whether it succeeded.
    async fn resync(&self, sub: &mut Subscription) -> bool {
        match self.source.snapshot(&self.scope).await {
            Ok(snapshot) => {
                sub.prime(&snapshot);
                self.state.send_modify(|s| s.replace(snapshot));
                true
            }
            Err(e) => {
                warn!(scope = ?self.scope, error = %e, "Resync failed");
                self.state.send_modify(|s| s.data_is_fresh = false);
                false
            }
        }
    }

    async fn poll(&self) {
        match self.source.snapshot(&self.scope).await {
            Ok(snapshot) => self.state.send_modify(|s| s.replace(snapshot)),
            Err(e) => {
                debug!(scope = ?self.scope, error = %e, "Poll failed");
                self.state.send_modify(|s| s.data_is_fresh = false);
            }
        }
    }

    fn set_connected(&self, connected: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.channel_connected != connected;
            s.channel_connected = connected;
            changed
        });
    }
}
