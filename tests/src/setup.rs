//! Common test setup functions.

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState};
use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestResponse, TestServer};
use portal_core::{HotelConfig, Session};
use realtime::ChangeBus;
use request_store::{
    RequestStore, SessionConfig, SessionRegistry, SessionResolver, ShortLinks, StaticDirectory,
};
use std::sync::Arc;
use telemetry::HealthRegistry;
use url::Url;
use uuid::Uuid;

use crate::fixtures;
use crate::mocks::MockStore;

/// Test context driving the real router.
///
/// Production code paths end to end, except that the store is a
/// [`MockStore`] with failure injection and the directory is seeded from
/// [`fixtures`].
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MockStore>,
    pub harbor: HotelConfig,
    pub cliffside: HotelConfig,
    pub server: TestServer,
}

impl TestContext {
    /// Create a new test context with a generous submission limit.
    pub fn new() -> Self {
        Self::with_rate_limit(RateLimitConfig {
            rate: 100.0,
            burst: 100,
        })
    }

    pub fn with_rate_limit(rate_limit: RateLimitConfig) -> Self {
        Self::build(rate_limit, ChangeBus::default())
    }

    /// A context whose per-tenant channels hold only `capacity` changes,
    /// so slow observers lag quickly.
    pub fn with_bus_capacity(capacity: usize) -> Self {
        Self::build(
            RateLimitConfig {
                rate: 100.0,
                burst: 100,
            },
            ChangeBus::new(capacity),
        )
    }

    fn build(rate_limit: RateLimitConfig, bus: ChangeBus) -> Self {
        let harbor = fixtures::harbor_view();
        let cliffside = fixtures::cliffside();

        let mut directory = StaticDirectory::new();
        directory.add_hotel(harbor.clone()).unwrap();
        directory.add_hotel(cliffside.clone()).unwrap();
        for code in fixtures::qr_codes(&harbor, &cliffside) {
            directory.add_code(code).unwrap();
        }

        let resolver = SessionResolver::new(
            Arc::new(directory),
            SessionRegistry::new(&SessionConfig::default()),
        );

        let shortlinks = ShortLinks::new();
        shortlinks.insert("spa", Url::parse("https://harborview.example.com/spa").unwrap());

        let store = Arc::new(MockStore::new());
        let health = Arc::new(HealthRegistry::new());
        health.store.set_healthy();
        health.realtime.set_healthy();

        let state = AppState::new(
            store.clone() as Arc<dyn RequestStore>,
            Arc::new(bus),
            resolver,
            health,
        )
        .with_rate_limit(rate_limit)
        .with_shortlinks(Arc::new(shortlinks));

        let server = TestServer::new(router(state.clone())).expect("Failed to create test server");

        Self {
            state,
            store,
            harbor,
            cliffside,
            server,
        }
    }

    /// A server over a real socket, sharing this context's state. Needed
    /// for WebSocket upgrades.
    pub fn ws_server(&self) -> TestServer {
        TestServer::builder()
            .http_transport()
            .build(router(self.state.clone()))
            .expect("Failed to create http test server")
    }

    /// Scans a QR code and returns the response body.
    pub async fn scan(&self, token: &str) -> serde_json::Value {
        let response = self.server.get(&format!("/guest/qr/{}", token)).await;
        response.assert_status_ok();
        response.json()
    }

    /// Scans a QR code and returns the issued session id.
    pub async fn session_for(&self, token: &str) -> String {
        let body = self.scan(token).await;
        body["session"]["guestSessionId"]
            .as_str()
            .expect("guestSessionId missing")
            .to_string()
    }

    /// Registers a session directly, bypassing QR resolution.
    pub async fn register(&self, session: Session) -> String {
        let id = session.guest_session_id.to_string();
        self.state.resolver.registry().insert(session).await;
        id
    }

    pub async fn create(&self, session_id: &str, body: &serde_json::Value) -> TestResponse {
        let (name, value) = session_header(session_id);
        self.server
            .post("/guest/requests")
            .add_header(name, value)
            .json(body)
            .await
    }

    pub async fn list(&self, session_id: &str) -> TestResponse {
        let (name, value) = session_header(session_id);
        self.server.get("/guest/requests").add_header(name, value).await
    }

    pub async fn update_status(&self, request_id: &str, body: serde_json::Value) -> TestResponse {
        self.server
            .patch(&format!("/staff/requests/{}/status", request_id))
            .json(&body)
            .await
    }

    pub async fn tenant_listing(&self, tenant_id: Uuid) -> TestResponse {
        self.server
            .get(&format!("/staff/tenants/{}/requests", tenant_id))
            .await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The guest session header.
pub fn session_header(session_id: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-guest-session"),
        HeaderValue::from_str(session_id).expect("Invalid header value"),
    )
}
