//! Tenant (hotel) reference data attached to a guest session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::request::ServiceType;

/// Wi-Fi credentials shown on the guest's Wi-Fi screen.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WifiCredentials {
    #[validate(length(min = 1, max = 64))]
    pub ssid: String,
    #[validate(length(max = 128))]
    pub password: String,
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Read-only hotel configuration, as seen by the guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HotelConfig {
    pub tenant_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<url::Url>,
    #[serde(default)]
    #[validate(nested)]
    pub wifi: Option<WifiCredentials>,
    pub enabled_services: BTreeSet<ServiceType>,
}

impl HotelConfig {
    /// Creates a hotel with the given services switched on.
    pub fn new(name: impl Into<String>, services: impl IntoIterator<Item = ServiceType>) -> Self {
        Self {
            tenant_id: Uuid::new_v4(),
            name: name.into(),
            logo_url: None,
            wifi: None,
            enabled_services: services.into_iter().collect(),
        }
    }

    pub fn with_wifi(mut self, ssid: impl Into<String>, password: impl Into<String>) -> Self {
        self.wifi = Some(WifiCredentials {
            ssid: ssid.into(),
            password: password.into(),
        });
        self
    }

    pub fn is_enabled(&self, service: ServiceType) -> bool {
        service.is_always_available() || self.enabled_services.contains(&service)
    }

    /// Services for a location: the hotel's switches, narrowed by the QR
    /// code's own allow-list when it has one.
    pub fn services_for(&self, allow_list: Option<&BTreeSet<ServiceType>>) -> BTreeSet<ServiceType> {
        match allow_list {
            Some(allowed) => self
                .enabled_services
                .intersection(allowed)
                .copied()
                .collect(),
            None => self.enabled_services.clone(),
        }
    }
}
