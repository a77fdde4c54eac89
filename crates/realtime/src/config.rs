//! Real-time channel configuration.

use crate::backoff::ReconnectConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-tenant broadcast buffer. Slower subscribers observe a lag and resync.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
    #[serde(default = "default_reconnect_initial_ms")]
    pub reconnect_initial_ms: u64,
    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
    #[serde(default = "default_reconnect_multiplier")]
    pub reconnect_multiplier: f64,
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_heartbeat_secs() -> u64 {
    30
}

fn default_reconnect_initial_ms() -> u64 {
    1_000
}

fn default_reconnect_max_ms() -> u64 {
    30_000
}

fn default_reconnect_multiplier() -> f64 {
    2.0
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            heartbeat_secs: default_heartbeat_secs(),
            reconnect_initial_ms: default_reconnect_initial_ms(),
            reconnect_max_ms: default_reconnect_max_ms(),
            reconnect_multiplier: default_reconnect_multiplier(),
        }
    }
}

impl RealtimeConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs.max(1))
    }

    /// Backoff parameters. Delays are at least 1ms and never shrink, so a
    /// zeroed config cannot turn the reconnect loop into a spin.
    pub fn reconnect(&self) -> ReconnectConfig {
        let initial_ms = self.reconnect_initial_ms.max(1);
        ReconnectConfig {
            initial_delay: Duration::from_millis(initial_ms),
            max_delay: Duration::from_millis(self.reconnect_max_ms.max(initial_ms)),
            multiplier: self.reconnect_multiplier.max(1.0),
        }
    }
}
