//! Lookup of QR codes and hotel configuration.

use crate::config::DirectoryConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_core::{Error, HotelConfig, Location, QrToken, Result, ServiceType};
use std::collections::{BTreeSet, HashMap};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// A printed QR code and the place it is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct QrCode {
    pub token: String,
    pub tenant_id: Uuid,
    pub location: Location,
    /// Narrows the hotel's services at this location when present.
    pub services: Option<BTreeSet<ServiceType>>,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl QrCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Read access to reference data owned by the external store.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn qr_code(&self, token: &QrToken) -> Result<Option<QrCode>>;

    async fn hotel(&self, tenant_id: Uuid) -> Result<Option<HotelConfig>>;
}

/// Directory loaded once from configuration.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    codes: HashMap<String, QrCode>,
    hotels: HashMap<Uuid, HotelConfig>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the directory, rejecting malformed seed records.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self> {
        let mut directory = Self::new();

        for seed in &config.hotels {
            let hotel = HotelConfig {
                tenant_id: seed.tenant_id,
                name: seed.name.clone(),
                logo_url: seed.logo_url.clone(),
                wifi: seed.wifi.clone(),
                enabled_services: seed.enabled_services.iter().copied().collect(),
            };
            directory.add_hotel(hotel)?;
        }

        for seed in &config.qr_codes {
            let token = QrToken::parse(&seed.token)
                .map_err(|_| Error::validation(format!("qr_codes: malformed token {:?}", seed.token)))?;
            let location = Location::new(seed.location_type, seed.room_id.clone())?;
            directory.add_code(QrCode {
                token: token.as_str().to_string(),
                tenant_id: seed.tenant_id,
                location,
                services: seed
                    .services
                    .as_ref()
                    .map(|s| s.iter().copied().collect()),
                active: seed.active,
                expires_at: seed.expires_at,
            })?;
        }

        info!(
            hotels = directory.hotels.len(),
            qr_codes = directory.codes.len(),
            "Loaded directory"
        );
        Ok(directory)
    }

    pub fn add_hotel(&mut self, hotel: HotelConfig) -> Result<()> {
        hotel.validate()?;
        self.hotels.insert(hotel.tenant_id, hotel);
        Ok(())
    }

    /// QR codes must point at a known hotel.
    pub fn add_code(&mut self, code: QrCode) -> Result<()> {
        if !self.hotels.contains_key(&code.tenant_id) {
            return Err(Error::validation(format!(
                "qr_codes: token {} references unknown tenant {}",
                code.token, code.tenant_id
            )));
        }
        self.codes.insert(code.token.clone(), code);
        Ok(())
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn qr_code(&self, token: &QrToken) -> Result<Option<QrCode>> {
        Ok(self.codes.get(token.as_str()).cloned())
    }

    async fn hotel(&self, tenant_id: Uuid) -> Result<Option<HotelConfig>> {
        Ok(self.hotels.get(&tenant_id).cloned())
    }
}
