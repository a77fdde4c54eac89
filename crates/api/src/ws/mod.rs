//! WebSocket request streams.

pub mod handler;
pub mod heartbeat;
pub mod manager;
pub mod message;

pub use heartbeat::run_heartbeat;
pub use manager::{ConnectionManager, WsSender};
pub use message::ServerMessage;
