//! Telemetry for the guest portal: structured logging, component health,
//! and in-process metrics exposed on the health endpoints.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
