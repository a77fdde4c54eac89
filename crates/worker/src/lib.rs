//! Background services for the guest portal.
//!
//! Nothing here starts itself. The composition root builds a
//! [`WorkerScheduler`], calls `start()`, and later shuts the returned
//! [`WorkerHandles`] down:
//! - Session sweeper (expired sessions, idle channels, idle rate buckets)
//! - Health monitor (store probe, change bus state)
//! - WebSocket heartbeat

pub mod monitor;
pub mod scheduler;
pub mod sweeper;

pub use monitor::HealthMonitor;
pub use scheduler::*;
pub use sweeper::{SessionSweeper, SweepReport};
