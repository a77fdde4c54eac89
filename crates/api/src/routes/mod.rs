//! API routes.

pub mod guest;
pub mod health;
pub mod shortlink;
pub mod staff;

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;
use crate::ws::handler::{guest_stream, staff_stream};

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/q/:code", get(shortlink::follow_handler))
        .route("/guest/qr/:token", get(guest::resolve_handler))
        .route(
            "/guest/requests",
            get(guest::list_handler).post(guest::create_handler),
        )
        .route("/guest/realtime", get(guest_stream))
        .route(
            "/staff/tenants/:tenant_id/requests",
            get(staff::list_handler),
        )
        .route(
            "/staff/requests/:request_id/status",
            patch(staff::update_status_handler),
        )
        .route("/staff/tenants/:tenant_id/realtime", get(staff_stream))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/health/metrics", get(health::metrics_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
