//! Request store, session registry, and directory for the guest portal.
//!
//! The durable store lives outside this service; [`MemoryStore`] is the
//! authoritative in-process implementation behind the [`RequestStore`] seam.

pub mod config;
pub mod directory;
pub mod health;
pub mod registry;
pub mod resolver;
pub mod shortlink;
pub mod store;

pub use config::*;
pub use directory::{Directory, QrCode, StaticDirectory};
pub use registry::SessionRegistry;
pub use resolver::{ResolvedSession, SessionResolver};
pub use shortlink::{ShortLink, ShortLinks};
pub use store::{Clock, MemoryStore, RequestStore};
