//! In-process metrics.
//!
//! Lock-free counters, gauges, and latency histograms, read as a
//! [`MetricsSnapshot`] by `/health/metrics` and the health monitor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Saturates at zero.
    pub fn dec(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the guest portal.
#[derive(Debug, Default)]
pub struct Metrics {
    // Sessions
    pub sessions_resolved: Counter,
    pub sessions_failed: Counter,
    pub sessions_resumed: Counter,

    // Requests
    pub requests_created: Counter,
    pub requests_rejected: Counter,
    pub status_updates: Counter,
    pub invalid_transitions: Counter,
    pub rate_limited_requests: Counter,

    // Real-time
    pub events_published: Counter,
    pub events_dropped: Counter,
    pub resyncs: Counter,

    // Short links
    pub shortlink_clicks: Counter,

    // Latency histograms
    pub create_latency_ms: Histogram,

    // Gauges
    pub active_subscribers: Gauge,
    pub ws_connections: Gauge,
    pub live_sessions: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub sessions_resolved: u64,
    pub sessions_failed: u64,
    pub sessions_resumed: u64,
    pub requests_created: u64,
    pub requests_rejected: u64,
    pub status_updates: u64,
    pub invalid_transitions: u64,
    pub rate_limited_requests: u64,
    pub events_published: u64,
    pub events_dropped: u64,
    pub resyncs: u64,
    pub shortlink_clicks: u64,
    pub create_latency_mean_ms: f64,
    pub active_subscribers: u64,
    pub ws_connections: u64,
    pub live_sessions: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            sessions_resolved: self.sessions_resolved.get(),
            sessions_failed: self.sessions_failed.get(),
            sessions_resumed: self.sessions_resumed.get(),
            requests_created: self.requests_created.get(),
            requests_rejected: self.requests_rejected.get(),
            status_updates: self.status_updates.get(),
            invalid_transitions: self.invalid_transitions.get(),
            rate_limited_requests: self.rate_limited_requests.get(),
            events_published: self.events_published.get(),
            events_dropped: self.events_dropped.get(),
            resyncs: self.resyncs.get(),
            shortlink_clicks: self.shortlink_clicks.get(),
            create_latency_mean_ms: self.create_latency_ms.mean(),
            active_subscribers: self.active_subscribers.get(),
            ws_connections: self.ws_connections.get(),
            live_sessions: self.live_sessions.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
