//! Store and directory configuration.

use chrono::{DateTime, Utc};
use portal_core::{LocationType, ServiceType, WifiCredentials};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum sessions held in the registry.
    #[serde(default = "default_capacity")]
    pub capacity: u64,
    /// How long a lapsed session is still remembered, so that clients get
    /// `SessionExpired` rather than `SessionNotFound`.
    #[serde(default = "default_grace_hours")]
    pub grace_hours: u64,
}

fn default_capacity() -> u64 {
    100_000
}

fn default_grace_hours() -> u64 {
    24
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            grace_hours: default_grace_hours(),
        }
    }
}

/// Reference data normally owned by the external store: hotels, the QR
/// codes printed for their locations, and marketing short links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub hotels: Vec<HotelSeed>,
    #[serde(default)]
    pub qr_codes: Vec<QrCodeSeed>,
    #[serde(default)]
    pub short_links: Vec<ShortLinkSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelSeed {
    pub tenant_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<url::Url>,
    #[serde(default)]
    pub wifi: Option<WifiCredentials>,
    #[serde(default)]
    pub enabled_services: Vec<ServiceType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCodeSeed {
    pub token: String,
    pub tenant_id: Uuid,
    pub location_type: LocationType,
    #[serde(default)]
    pub room_id: Option<String>,
    /// Narrows the hotel's services for this location.
    #[serde(default)]
    pub services: Option<Vec<ServiceType>>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortLinkSeed {
    pub code: String,
    pub target: url::Url,
}
