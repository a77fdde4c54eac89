//! Real-time synchronization of service requests.
//!
//! Changes are fanned out on one broadcast channel per tenant. Observers
//! either consume a [`Subscription`] directly (WebSocket streams) or run a
//! [`SyncedView`] that keeps a local cache converged with the store across
//! disconnects.

pub mod backoff;
pub mod bus;
pub mod config;
pub mod scope;
pub mod subscription;
pub mod sync;

pub use backoff::{next_delay, ReconnectConfig};
pub use bus::ChangeBus;
pub use config::RealtimeConfig;
pub use scope::Scope;
pub use subscription::{Subscription, SubscriptionEvent};
pub use sync::{SnapshotSource, SyncHandle, SyncedView, ViewState};
