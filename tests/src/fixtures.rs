//! Test fixtures: hotels, QR codes, catalogs and request bodies.

use chrono::{Duration, Utc};
use portal_core::flows::{HousekeepingItem, MenuItem, RequestDraft};
use portal_core::{HotelConfig, HousekeepingCategory, Location, LocationType, ServiceType};
use request_store::QrCode;
use std::collections::BTreeSet;
use uuid::Uuid;

pub const ROOM_TOKEN: &str = "harbor-room-305";
pub const POOL_TOKEN: &str = "harbor-pool-deck";
pub const RETIRED_TOKEN: &str = "harbor-room-101-old";
pub const EXPIRED_TOKEN: &str = "harbor-event-2023";
pub const OTHER_HOTEL_TOKEN: &str = "cliffside-room-12";

pub const WIFI_SSID: &str = "HarborView-Guest";
pub const WIFI_PASSWORD: &str = "harbor-2024";

/// Room service, housekeeping and Wi-Fi; maintenance is switched off.
pub fn harbor_view() -> HotelConfig {
    HotelConfig::new(
        "Harbor View Hotel",
        [ServiceType::RoomService, ServiceType::Housekeeping, ServiceType::Wifi],
    )
    .with_wifi(WIFI_SSID, WIFI_PASSWORD)
}

pub fn cliffside() -> HotelConfig {
    HotelConfig::new("Cliffside Inn", ServiceType::ALL)
}

/// Every QR code used by the tests.
pub fn qr_codes(harbor: &HotelConfig, cliffside: &HotelConfig) -> Vec<QrCode> {
    let code = |token: &str, tenant_id: Uuid, location: Location| QrCode {
        token: token.to_string(),
        tenant_id,
        location,
        services: None,
        active: true,
        expires_at: None,
    };

    let mut pool = code(
        POOL_TOKEN,
        harbor.tenant_id,
        Location::new(LocationType::Pool, None).unwrap(),
    );
    pool.services = Some(BTreeSet::from([ServiceType::RoomService]));

    let mut retired = code(RETIRED_TOKEN, harbor.tenant_id, Location::room("101"));
    retired.active = false;

    let mut expired = code(
        EXPIRED_TOKEN,
        harbor.tenant_id,
        Location::new(LocationType::Restaurant, None).unwrap(),
    );
    expired.expires_at = Some(Utc::now() - Duration::days(30));

    vec![
        code(ROOM_TOKEN, harbor.tenant_id, Location::room("305")),
        pool,
        retired,
        expired,
        code(OTHER_HOTEL_TOKEN, cliffside.tenant_id, Location::room("12")),
    ]
}

pub fn menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("club-sandwich", "Club Sandwich", 3500, 20),
        MenuItem::new("fries", "Fries", 1500, 10),
        MenuItem::new("espresso", "Espresso", 400, 5),
    ]
}

pub fn housekeeping_catalog() -> Vec<HousekeepingItem> {
    vec![
        HousekeepingItem::new("extra-towels", "Extra towels", HousekeepingCategory::Amenities, 10),
        HousekeepingItem::new("make-bed", "Make bed", HousekeepingCategory::Cleaning, 15),
        HousekeepingItem::new("laundry-pickup", "Laundry pickup", HousekeepingCategory::Laundry, 30),
    ]
}

/// Creation body for a flow draft.
pub fn draft_body(tenant_id: Uuid, draft: RequestDraft) -> serde_json::Value {
    let mut body = serde_json::to_value(&draft.details).unwrap();
    body["tenantId"] = serde_json::json!(tenant_id);
    body["title"] = serde_json::json!(draft.title);
    body
}

/// Smallest valid body: a Wi-Fi access record.
pub fn wifi_body(tenant_id: Uuid) -> serde_json::Value {
    serde_json::json!({
        "tenantId": tenant_id,
        "type": "wifi",
        "payload": {}
    })
}

/// A well-formed maintenance ticket.
pub fn maintenance_body(tenant_id: Uuid) -> serde_json::Value {
    serde_json::json!({
        "tenantId": tenant_id,
        "type": "maintenance",
        "payload": {
            "issue": { "kind": "catalog", "issueId": "ac", "name": "Air conditioning" },
            "urgency": "high"
        }
    })
}

pub fn housekeeping_body(tenant_id: Uuid) -> serde_json::Value {
    serde_json::json!({
        "tenantId": tenant_id,
        "type": "housekeeping",
        "payload": {
            "items": [
                { "id": "extra-towels", "name": "Extra towels", "category": "amenities", "estimatedMinutes": 10 }
            ],
            "estimatedCompletionTime": 10
        }
    })
}
