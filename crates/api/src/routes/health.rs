//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use telemetry::{metrics, MetricsSnapshot};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - Full health check.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = state.health.report();

    Json(HealthResponse {
        status: format!("{:?}", report.status).to_lowercase(),
        store_connected: state.health.store.is_healthy(),
        realtime_connected: state.health.realtime.is_healthy(),
        active_subscribers: metrics().active_subscribers.get(),
        ws_connections: state.connections.connection_count() as u64,
    })
}

/// GET /health/ready - Readiness probe (can accept traffic).
pub async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if state.health.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler(State(state): State<AppState>) -> StatusCode {
    if state.health.is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/metrics - In-process counters.
pub async fn metrics_handler() -> Json<MetricsSnapshot> {
    Json(metrics().snapshot())
}
