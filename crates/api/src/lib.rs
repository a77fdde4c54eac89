//! HTTP and WebSocket API for the guest portal.

pub mod desk;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod ws;

pub use desk::RequestDesk;
pub use routes::router;
pub use state::{AppState, PortalSettings};
