//! Component health probes feeding the registry behind `/health`.

use realtime::ChangeBus;
use request_store::{health::check_store, RequestStore};
use std::sync::Arc;
use telemetry::HealthRegistry;
use tracing::{info, warn};

pub struct HealthMonitor {
    store: Arc<dyn RequestStore>,
    bus: Arc<ChangeBus>,
    health: Arc<HealthRegistry>,
}

impl HealthMonitor {
    pub fn new(store: Arc<dyn RequestStore>, bus: Arc<ChangeBus>, health: Arc<HealthRegistry>) -> Self {
        Self { store, bus, health }
    }

    /// Probes every component once. Only state flips are logged.
    pub async fn check(&self) {
        let store_ok = check_store(self.store.as_ref()).await;
        if self
            .health
            .store
            .record(store_ok, || "store probe failed".to_string())
        {
            if store_ok {
                info!("Request store recovered");
            } else {
                warn!("Request store unhealthy");
            }
        }

        let realtime_ok = !self.bus.is_closed();
        if self
            .health
            .realtime
            .record(realtime_ok, || "change bus closed".to_string())
        {
            if realtime_ok {
                info!("Change bus available");
            } else {
                warn!("Change bus unavailable, streams degraded");
            }
        }
    }
}
