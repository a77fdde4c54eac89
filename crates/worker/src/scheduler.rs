//! Worker scheduler for background services.

use api::ws::{run_heartbeat, ConnectionManager};
use api::AppState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::monitor::HealthMonitor;
use crate::sweeper::SessionSweeper;

/// Worker scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Session sweep interval (seconds)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Health probe interval (seconds)
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,
    /// Rate buckets idle this long are dropped (seconds)
    #[serde(default = "default_bucket_idle_secs")]
    pub bucket_idle_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_health_interval_secs() -> u64 {
    10
}

fn default_bucket_idle_secs() -> u64 {
    600
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            health_interval_secs: default_health_interval_secs(),
            bucket_idle_secs: default_bucket_idle_secs(),
        }
    }
}

impl WorkerConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }

    pub fn bucket_idle(&self) -> Duration {
        Duration::from_secs(self.bucket_idle_secs)
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    sweeper: SessionSweeper,
    monitor: HealthMonitor,
    connections: Arc<ConnectionManager>,
    sweep_interval: Duration,
    health_interval: Duration,
    heartbeat_interval: Duration,
}

impl WorkerScheduler {
    pub fn new(config: &WorkerConfig, state: &AppState) -> Self {
        Self {
            sweeper: SessionSweeper::new(
                state.resolver.registry().clone(),
                state.bus().clone(),
                state.rate_limiter.clone(),
                config.bucket_idle(),
            ),
            monitor: HealthMonitor::new(state.store().clone(), state.bus().clone(), state.health.clone()),
            connections: state.connections.clone(),
            sweep_interval: config.sweep_interval(),
            health_interval: config.health_interval(),
            heartbeat_interval: state.realtime.heartbeat_interval(),
        }
    }

    /// Starts all background workers.
    pub fn start(self) -> WorkerHandles {
        let cancel = CancellationToken::new();
        let mut handles = Vec::new();

        let sweeper = self.sweeper;
        let sweep_interval = self.sweep_interval;
        let token = cancel.clone();
        handles.push(tokio::spawn(async move {
            let mut ticker = interval(sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        sweeper.run().await;
                    }
                }
            }
        }));

        // First tick fires immediately so readiness reflects reality at boot.
        let monitor = self.monitor;
        let health_interval = self.health_interval;
        let token = cancel.clone();
        handles.push(tokio::spawn(async move {
            let mut ticker = interval(health_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => monitor.check().await,
                }
            }
        }));

        handles.push(tokio::spawn(run_heartbeat(
            self.connections,
            self.heartbeat_interval,
            cancel.clone(),
        )));

        info!(workers = handles.len(), "Background workers started");
        WorkerHandles { cancel, handles }
    }
}

/// Running workers. Dropping this does not stop them; call
/// [`shutdown`](Self::shutdown).
pub struct WorkerHandles {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerHandles {
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Signals every worker and waits for them to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker ended abnormally");
            }
        }
        info!("Background workers stopped");
    }
}
