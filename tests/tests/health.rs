//! Tests for health check endpoints.

use axum::http::StatusCode;
use integration_tests::{
    fixtures::{self, ROOM_TOKEN},
    setup::TestContext,
};
use worker::HealthMonitor;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store_connected"], true);
    assert_eq!(body["realtime_connected"], true);
    assert!(body["active_subscribers"].as_u64().is_some());
    assert_eq!(body["ws_connections"], 0);
}

#[tokio::test]
async fn test_ready_and_live() {
    let ctx = TestContext::new();

    ctx.server.get("/health/ready").await.assert_status_ok();
    ctx.server.get("/health/live").await.assert_status_ok();
}

/// A failing store takes the service out of rotation; a closed change bus
/// only degrades it.
#[tokio::test]
async fn test_monitor_drives_readiness() {
    let ctx = TestContext::new();
    let monitor = HealthMonitor::new(
        ctx.state.store().clone(),
        ctx.state.bus().clone(),
        ctx.state.health.clone(),
    );

    ctx.state.bus().close();
    monitor.check().await;
    ctx.server.get("/health/ready").await.assert_status_ok();
    let body: serde_json::Value = ctx.server.get("/health").await.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["realtime_connected"], false);

    ctx.store.set_should_fail(true);
    monitor.check().await;
    ctx.server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = ctx.server.get("/health").await.json();
    assert_eq!(body["status"], "unhealthy");

    ctx.store.set_should_fail(false);
    ctx.state.bus().reopen();
    monitor.check().await;
    ctx.server.get("/health/ready").await.assert_status_ok();
}

#[tokio::test]
async fn test_metrics_count_created_requests() {
    let ctx = TestContext::new();
    let session_id = ctx.session_for(ROOM_TOKEN).await;

    let before: serde_json::Value = ctx.server.get("/health/metrics").await.json();
    ctx.create(&session_id, &fixtures::wifi_body(ctx.harbor.tenant_id))
        .await
        .assert_status(StatusCode::CREATED);
    let after: serde_json::Value = ctx.server.get("/health/metrics").await.json();

    // Metrics are process-wide and other tests run concurrently.
    assert!(after["requests_created"].as_u64().unwrap() > before["requests_created"].as_u64().unwrap());
    assert!(after["sessions_resolved"].as_u64().unwrap() >= 1);
}
