//! Application state shared across handlers.

use crate::desk::RequestDesk;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};
use crate::ws::ConnectionManager;
use realtime::{ChangeBus, RealtimeConfig};
use request_store::{RequestStore, SessionResolver, ShortLinks};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use telemetry::HealthRegistry;

/// Knobs for the HTTP surface itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSettings {
    /// Seconds the "link not found" page waits before redirecting.
    #[serde(default = "default_not_found_delay_secs")]
    pub not_found_delay_secs: u64,
    /// Where that page redirects to.
    #[serde(default = "default_not_found_path")]
    pub not_found_path: String,
}

fn default_not_found_delay_secs() -> u64 {
    3
}

fn default_not_found_path() -> String {
    "/not-found".to_string()
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            not_found_delay_secs: default_not_found_delay_secs(),
            not_found_path: default_not_found_path(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Write path (store plus change fan-out)
    pub desk: RequestDesk,
    /// QR token and session validation
    pub resolver: SessionResolver,
    /// Component health, owned by the composition root
    pub health: Arc<HealthRegistry>,
    /// Per-session submission limiter
    pub rate_limiter: SharedRateLimiter,
    pub shortlinks: Arc<ShortLinks>,
    /// Open WebSocket streams
    pub connections: Arc<ConnectionManager>,
    pub realtime: RealtimeConfig,
    pub settings: PortalSettings,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RequestStore>,
        bus: Arc<ChangeBus>,
        resolver: SessionResolver,
        health: Arc<HealthRegistry>,
    ) -> Self {
        Self {
            desk: RequestDesk::new(store, bus),
            resolver,
            health,
            rate_limiter: Arc::new(RateLimiter::new(RateLimitConfig::default())),
            shortlinks: Arc::new(ShortLinks::new()),
            connections: Arc::new(ConnectionManager::new()),
            realtime: RealtimeConfig::default(),
            settings: PortalSettings::default(),
        }
    }

    pub fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limiter = Arc::new(RateLimiter::new(config));
        self
    }

    pub fn with_shortlinks(mut self, shortlinks: Arc<ShortLinks>) -> Self {
        self.shortlinks = shortlinks;
        self
    }

    pub fn with_realtime(mut self, config: RealtimeConfig) -> Self {
        self.realtime = config;
        self
    }

    pub fn with_settings(mut self, settings: PortalSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn store(&self) -> &Arc<dyn RequestStore> {
        self.desk.store()
    }

    pub fn bus(&self) -> &Arc<ChangeBus> {
        self.desk.bus()
    }
}
