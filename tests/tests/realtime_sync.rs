//! Change fan-out from the HTTP write path to observers.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use integration_tests::{
    fixtures::{self, POOL_TOKEN, ROOM_TOKEN},
    setup::TestContext,
};
use axum_test::TestWebSocket;
use integration_tests::fixtures::OTHER_HOTEL_TOKEN;
use portal_core::{ChangeKind, RequestChange, RequestStatus, ServiceRequest};
use realtime::{ReconnectConfig, Scope, SubscriptionEvent, SyncHandle, SyncedView, ViewState};
use serde_json::json;
use uuid::Uuid;

const WAIT: Duration = Duration::from_secs(5);

fn fast_reconnect() -> ReconnectConfig {
    ReconnectConfig {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        multiplier: 2.0,
    }
}

fn observe(ctx: &TestContext, scope: Scope) -> SyncHandle {
    SyncedView::spawn(ctx.store.clone(), ctx.state.bus().clone(), scope, fast_reconnect())
}

async fn next_frame(ws: &mut TestWebSocket) -> serde_json::Value {
    tokio::time::timeout(WAIT, ws.receive_json::<serde_json::Value>())
        .await
        .expect("no frame received")
}

async fn wait_for<F>(view: &mut SyncHandle, predicate: F) -> ViewState
where
    F: FnMut(&ViewState) -> bool,
{
    tokio::time::timeout(WAIT, view.wait_for(predicate))
        .await
        .expect("view did not converge")
        .expect("observer stopped")
}

#[tokio::test]
async fn test_subscriber_receives_created_and_updated() {
    let ctx = TestContext::new();
    let session_id = ctx.session_for(ROOM_TOKEN).await;
    let mut sub = ctx
        .state
        .bus()
        .subscribe(Scope::staff(ctx.harbor.tenant_id))
        .unwrap();

    let created: ServiceRequest = ctx
        .create(&session_id, &fixtures::wifi_body(ctx.harbor.tenant_id))
        .await
        .json();
    ctx.update_status(&created.id.to_string(), json!({ "status": "assigned" }))
        .await
        .assert_status_ok();

    match tokio::time::timeout(WAIT, sub.next()).await.unwrap() {
        SubscriptionEvent::Change(change) => {
            assert_eq!(change.kind, ChangeKind::Created);
            assert_eq!(change.request.id, created.id);
        }
        other => panic!("unexpected event {:?}", other),
    }
    match tokio::time::timeout(WAIT, sub.next()).await.unwrap() {
        SubscriptionEvent::Change(change) => {
            assert_eq!(change.kind, ChangeKind::Updated);
            assert_eq!(change.request.status, RequestStatus::Assigned);
            assert_eq!(change.request.revision, 2);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_guest_view_tracks_own_requests_only() {
    let ctx = TestContext::new();
    let room = ctx.session_for(ROOM_TOKEN).await;
    let pool = ctx.session_for(POOL_TOKEN).await;
    let room_id = Uuid::parse_str(&room).unwrap();

    let mut view = observe(&ctx, Scope::guest(ctx.harbor.tenant_id, room_id));
    wait_for(&mut view, |s| s.channel_connected && s.data_is_fresh).await;

    let menu_order = json!({
        "tenantId": ctx.harbor.tenant_id,
        "type": "room-service",
        "payload": {
            "items": [
                { "menuItemId": "espresso", "name": "Espresso", "quantity": 1, "unitPrice": 400 }
            ],
            "totalAmount": 400,
            "guestName": "Grace",
            "estimatedPrepTime": 20
        }
    });
    ctx.create(&pool, &menu_order).await.assert_status(StatusCode::CREATED);
    let own: ServiceRequest = ctx
        .create(&room, &fixtures::wifi_body(ctx.harbor.tenant_id))
        .await
        .json();

    let state = wait_for(&mut view, |s| !s.requests.is_empty()).await;
    assert_eq!(state.requests.len(), 1);
    assert_eq!(state.requests[0].id, own.id);

    ctx.update_status(&own.id.to_string(), json!({ "status": "completed" }))
        .await
        .assert_status_ok();
    let state = wait_for(&mut view, |s| {
        s.get(own.id)
            .is_some_and(|r| r.status == RequestStatus::Completed)
    })
    .await;
    assert_eq!(state.requests.len(), 1);

    view.stop().await;
}

#[tokio::test]
async fn test_staff_view_converges_after_outage() {
    let ctx = TestContext::new();
    let session_id = ctx.session_for(ROOM_TOKEN).await;
    let bus = ctx.state.bus().clone();

    let mut view = observe(&ctx, Scope::staff(ctx.harbor.tenant_id));
    wait_for(&mut view, |s| s.channel_connected).await;

    bus.close();
    wait_for(&mut view, |s| !s.channel_connected).await;

    // Creation never depends on the push channel.
    let missed: ServiceRequest = ctx
        .create(&session_id, &fixtures::housekeeping_body(ctx.harbor.tenant_id))
        .await
        .json();

    bus.reopen();
    let state = wait_for(&mut view, |s| {
        s.channel_connected && s.get(missed.id).is_some()
    })
    .await;
    assert!(state.data_is_fresh);

    let after: ServiceRequest = ctx
        .create(&session_id, &fixtures::wifi_body(ctx.harbor.tenant_id))
        .await
        .json();
    let state = wait_for(&mut view, |s| s.get(after.id).is_some()).await;
    assert_eq!(state.requests.len(), 2);
    assert_eq!(state.requests[0].id, after.id);

    view.stop().await;
}

#[tokio::test]
async fn test_store_outage_marks_data_stale_not_disconnected() {
    let ctx = TestContext::new();
    let store = Arc::clone(&ctx.store);

    store.set_should_fail(true);
    let mut view = observe(&ctx, Scope::staff(ctx.harbor.tenant_id));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let state = view.current();
    assert!(!state.data_is_fresh);
    assert!(state.requests.is_empty());

    store.set_should_fail(false);
    let state = wait_for(&mut view, |s| s.channel_connected && s.data_is_fresh).await;
    assert!(state.last_synced_at.is_some());

    view.stop().await;
}

#[tokio::test]
async fn test_staff_stream_sends_snapshot_then_changes() {
    let ctx = TestContext::new();
    let room = ctx.session_for(ROOM_TOKEN).await;
    let other_hotel = ctx.session_for(OTHER_HOTEL_TOKEN).await;
    let existing: ServiceRequest = ctx
        .create(&room, &fixtures::wifi_body(ctx.harbor.tenant_id))
        .await
        .json();

    let server = ctx.ws_server();
    let mut ws = server
        .get_websocket(&format!("/staff/tenants/{}/realtime", ctx.harbor.tenant_id))
        .await
        .into_websocket()
        .await;

    let snapshot = next_frame(&mut ws).await;
    assert_eq!(snapshot["type"], "snapshot");
    let requests = snapshot["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["id"], existing.id.to_string());

    // Another tenant's traffic never reaches this stream.
    ctx.create(&other_hotel, &fixtures::wifi_body(ctx.cliffside.tenant_id))
        .await
        .assert_status(StatusCode::CREATED);
    let created: ServiceRequest = ctx
        .create(&room, &fixtures::housekeeping_body(ctx.harbor.tenant_id))
        .await
        .json();

    let frame = next_frame(&mut ws).await;
    assert_eq!(frame["type"], "change");
    assert_eq!(frame["kind"], "created");
    assert_eq!(frame["request"]["id"], created.id.to_string());

    ctx.update_status(&created.id.to_string(), json!({ "status": "assigned" }))
        .await
        .assert_status_ok();
    let frame = next_frame(&mut ws).await;
    assert_eq!(frame["type"], "change");
    assert_eq!(frame["kind"], "updated");
    assert_eq!(frame["request"]["status"], "assigned");
    assert_eq!(frame["request"]["revision"], 2);

    ws.close().await;
}

#[tokio::test]
async fn test_guest_stream_carries_own_requests_only() {
    let ctx = TestContext::new();
    let room = ctx.session_for(ROOM_TOKEN).await;
    let pool = ctx.session_for(POOL_TOKEN).await;

    let server = ctx.ws_server();
    let mut ws = server
        .get_websocket("/guest/realtime")
        .add_query_param("session", &room)
        .await
        .into_websocket()
        .await;

    let snapshot = next_frame(&mut ws).await;
    assert_eq!(snapshot["type"], "snapshot");
    assert!(snapshot["requests"].as_array().unwrap().is_empty());

    let menu_order = json!({
        "tenantId": ctx.harbor.tenant_id,
        "type": "room-service",
        "payload": {
            "items": [
                { "menuItemId": "espresso", "name": "Espresso", "quantity": 1, "unitPrice": 400 }
            ],
            "totalAmount": 400,
            "guestName": "Grace",
            "estimatedPrepTime": 20
        }
    });
    ctx.create(&pool, &menu_order).await.assert_status(StatusCode::CREATED);
    let own: ServiceRequest = ctx
        .create(&room, &fixtures::wifi_body(ctx.harbor.tenant_id))
        .await
        .json();

    let frame = next_frame(&mut ws).await;
    assert_eq!(frame["type"], "change");
    assert_eq!(frame["request"]["id"], own.id.to_string());
    assert_eq!(frame["request"]["sessionId"], room);

    ws.close().await;
}

#[tokio::test]
async fn test_guest_stream_requires_session() {
    let ctx = TestContext::new();
    let server = ctx.ws_server();

    let response = server.get_websocket("/guest/realtime").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server
        .get_websocket("/guest/realtime")
        .add_query_param("session", Uuid::new_v4().to_string())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lagging_stream_gets_resync_frame() {
    let ctx = TestContext::with_bus_capacity(2);
    let room = ctx.session_for(ROOM_TOKEN).await;
    let mut stored = Vec::new();
    for _ in 0..3 {
        let request: ServiceRequest = ctx
            .create(&room, &fixtures::wifi_body(ctx.harbor.tenant_id))
            .await
            .json();
        stored.push(request);
    }

    let server = ctx.ws_server();
    let mut ws = server
        .get_websocket(&format!("/staff/tenants/{}/realtime", ctx.harbor.tenant_id))
        .await
        .into_websocket()
        .await;
    let snapshot = next_frame(&mut ws).await;
    assert_eq!(snapshot["requests"].as_array().unwrap().len(), 3);

    // More changes than the channel holds, with no await in between, so
    // the stream's subscription overflows.
    for request in stored.iter().cycle().take(5) {
        let mut bumped = request.clone();
        bumped.revision += 1;
        ctx.state.bus().publish(RequestChange::updated(bumped));
    }

    let frame = next_frame(&mut ws).await;
    assert_eq!(frame["type"], "resync");
    let mut ids: Vec<_> = frame["requests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    let mut expected: Vec<_> = stored.iter().map(|r| r.id.to_string()).collect();
    expected.sort();
    assert_eq!(ids, expected);

    ws.close().await;
}
