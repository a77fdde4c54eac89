//! Guest journey: scan a code, submit requests, read them back.

use axum::http::StatusCode;
use integration_tests::{
    fixtures::{self, POOL_TOKEN, ROOM_TOKEN, WIFI_SSID},
    setup::{session_header, TestContext},
};
use portal_core::flows::{FeedbackFlow, HousekeepingFlow, RoomServiceFlow, ServiceFlow};
use portal_core::{ServiceRequest, StatusUpdate};

#[tokio::test]
async fn test_room_code_issues_session_with_hotel() {
    let ctx = TestContext::new();

    let body = ctx.scan(ROOM_TOKEN).await;

    assert_eq!(body["session"]["locationType"], "room");
    assert_eq!(body["session"]["roomId"], "305");
    assert_eq!(body["session"]["tenantId"], ctx.harbor.tenant_id.to_string());
    let services = body["session"]["enabledServices"].as_array().unwrap();
    assert!(services.iter().any(|s| s == "wifi"));
    assert_eq!(body["hotel"]["name"], "Harbor View Hotel");
    assert_eq!(body["hotel"]["wifi"]["ssid"], WIFI_SSID);
}

#[tokio::test]
async fn test_pool_code_narrows_services_and_hides_wifi() {
    let ctx = TestContext::new();

    let body = ctx.scan(POOL_TOKEN).await;

    assert_eq!(body["session"]["locationType"], "pool");
    assert!(body["session"]["roomId"].is_null());
    assert_eq!(
        body["session"]["enabledServices"],
        serde_json::json!(["room-service"])
    );
    assert!(body["hotel"]["wifi"].is_null());
}

#[tokio::test]
async fn test_held_session_is_resumed_for_same_code() {
    let ctx = TestContext::new();
    let first = ctx.session_for(ROOM_TOKEN).await;

    let (name, value) = session_header(&first);
    let body: serde_json::Value = ctx
        .server
        .get(&format!("/guest/qr/{}", ROOM_TOKEN))
        .add_header(name, value)
        .await
        .json();
    assert_eq!(body["session"]["guestSessionId"], first.as_str());

    // A different code issues a different session.
    let (name, value) = session_header(&first);
    let body: serde_json::Value = ctx
        .server
        .get(&format!("/guest/qr/{}", POOL_TOKEN))
        .add_header(name, value)
        .await
        .json();
    assert_ne!(body["session"]["guestSessionId"], first.as_str());
}

#[tokio::test]
async fn test_room_service_order_totals_and_creates_pending() {
    let ctx = TestContext::new();
    let session_id = ctx.session_for(ROOM_TOKEN).await;

    let mut flow = RoomServiceFlow::new(fixtures::menu());
    flow.add_item("club-sandwich").unwrap();
    flow.add_item("club-sandwich").unwrap();
    flow.add_item("fries").unwrap();
    flow.set_guest_name("Ada Lovelace");
    assert_eq!(flow.total_amount(), 8500);

    let draft = flow.draft().unwrap();
    let response = ctx
        .create(&session_id, &fixtures::draft_body(ctx.harbor.tenant_id, draft))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["type"], "room-service");
    assert_eq!(body["payload"]["totalAmount"], 8500);
    assert_eq!(body["roomId"], "305");
    assert_eq!(body["sessionId"], session_id.as_str());
    assert_eq!(body["revision"], 1);
    assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[tokio::test]
async fn test_housekeeping_eta_is_slowest_item() {
    let ctx = TestContext::new();
    let session_id = ctx.session_for(ROOM_TOKEN).await;

    let mut flow = HousekeepingFlow::new(fixtures::housekeeping_catalog());
    flow.toggle("extra-towels").unwrap();
    flow.toggle("make-bed").unwrap();
    assert_eq!(flow.estimated_completion_time(), 15);

    let response = ctx
        .create(
            &session_id,
            &fixtures::draft_body(ctx.harbor.tenant_id, flow.draft().unwrap()),
        )
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["payload"]["estimatedCompletionTime"], 15);
    assert_eq!(body["etaMinutes"], 15);
}

#[tokio::test]
async fn test_created_request_listed_exactly_once() {
    let ctx = TestContext::new();
    let session_id = ctx.session_for(ROOM_TOKEN).await;

    let first: ServiceRequest = ctx
        .create(&session_id, &fixtures::wifi_body(ctx.harbor.tenant_id))
        .await
        .json();
    let second: ServiceRequest = ctx
        .create(&session_id, &fixtures::housekeeping_body(ctx.harbor.tenant_id))
        .await
        .json();

    let listing: Vec<ServiceRequest> = ctx.list(&session_id).await.json();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing.iter().filter(|r| r.id == first.id).count(), 1);
    // Newest first.
    assert_eq!(listing[0].id, second.id);

    let again: Vec<ServiceRequest> = ctx.list(&session_id).await.json();
    assert_eq!(listing, again);
}

#[tokio::test]
async fn test_sessions_and_tenants_are_isolated() {
    let ctx = TestContext::new();
    let room = ctx.session_for(ROOM_TOKEN).await;
    let pool = ctx.session_for(POOL_TOKEN).await;

    let room_request: ServiceRequest = ctx
        .create(&room, &fixtures::wifi_body(ctx.harbor.tenant_id))
        .await
        .json();

    let pool_listing: Vec<ServiceRequest> = ctx.list(&pool).await.json();
    assert!(pool_listing.is_empty());

    let room_listing: Vec<ServiceRequest> = ctx.list(&room).await.json();
    assert_eq!(room_listing.len(), 1);
    assert_eq!(room_listing[0].id, room_request.id);

    let staff: Vec<ServiceRequest> = ctx.tenant_listing(ctx.harbor.tenant_id).await.json();
    assert_eq!(staff.len(), 1);

    let other: Vec<ServiceRequest> = ctx.tenant_listing(ctx.cliffside.tenant_id).await.json();
    assert!(other.is_empty());
}

#[tokio::test]
async fn test_feedback_after_completion() {
    let ctx = TestContext::new();
    let session_id = ctx.session_for(ROOM_TOKEN).await;

    let request: ServiceRequest = ctx
        .create(&session_id, &fixtures::housekeeping_body(ctx.harbor.tenant_id))
        .await
        .json();

    let completed: ServiceRequest = ctx
        .update_status(
            &request.id.to_string(),
            serde_json::to_value(StatusUpdate::to(portal_core::RequestStatus::Completed)).unwrap(),
        )
        .await
        .json();

    let mut flow = FeedbackFlow::for_request(&completed).unwrap();
    flow.set_rating(5).unwrap();
    flow.set_comment("Spotless, thank you").unwrap();

    let response = ctx
        .create(
            &session_id,
            &fixtures::draft_body(ctx.harbor.tenant_id, flow.draft().unwrap()),
        )
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["type"], "feedback");
    assert_eq!(body["payload"]["requestId"], request.id.to_string());
    assert_eq!(body["payload"]["rating"], 5);
}
