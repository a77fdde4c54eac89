//! Periodic cleanup of ephemeral state.

use api::middleware::rate_limit::SharedRateLimiter;
use realtime::ChangeBus;
use request_store::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tracing::debug;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub live_sessions: u64,
    pub channels_pruned: usize,
    pub buckets_dropped: usize,
}

/// Evicts lapsed sessions and drops per-tenant channels and per-session
/// rate buckets nobody is using.
pub struct SessionSweeper {
    registry: SessionRegistry,
    bus: Arc<ChangeBus>,
    rate_limiter: SharedRateLimiter,
    bucket_idle: Duration,
}

impl SessionSweeper {
    pub fn new(
        registry: SessionRegistry,
        bus: Arc<ChangeBus>,
        rate_limiter: SharedRateLimiter,
        bucket_idle: Duration,
    ) -> Self {
        Self {
            registry,
            bus,
            rate_limiter,
            bucket_idle,
        }
    }

    pub async fn run(&self) -> SweepReport {
        let live_sessions = self.registry.sweep().await;
        metrics().live_sessions.set(live_sessions);

        let report = SweepReport {
            live_sessions,
            channels_pruned: self.bus.prune(),
            buckets_dropped: self.rate_limiter.cleanup(self.bucket_idle),
        };

        debug!(
            live_sessions = report.live_sessions,
            channels_pruned = report.channels_pruned,
            buckets_dropped = report.buckets_dropped,
            "Sweep complete"
        );
        report
    }
}
