//! Guest session types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::limits::SESSION_TTL_HOURS;
use crate::request::ServiceType;

/// Kind of physical place a QR code is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Room,
    Bar,
    Pool,
    Restaurant,
    Other,
}

/// Where the guest scanned the code. `room_id` is present iff this is a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawLocation")]
pub struct Location {
    location_type: LocationType,
    room_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    location_type: LocationType,
    #[serde(default)]
    room_id: Option<String>,
}

impl TryFrom<RawLocation> for Location {
    type Error = Error;

    fn try_from(raw: RawLocation) -> Result<Self> {
        Location::new(raw.location_type, raw.room_id)
    }
}

impl Location {
    pub fn new(location_type: LocationType, room_id: Option<String>) -> Result<Self> {
        let room_id = room_id.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        match (location_type, room_id.is_some()) {
            (LocationType::Room, false) => Err(Error::validation("roomId: required for rooms")),
            (LocationType::Room, true) | (_, false) => Ok(Self {
                location_type,
                room_id,
            }),
            (_, true) => Err(Error::validation("roomId: only allowed for rooms")),
        }
    }

    pub fn room(room_id: impl Into<String>) -> Self {
        Self {
            location_type: LocationType::Room,
            room_id: Some(room_id.into()),
        }
    }

    pub fn venue(location_type: LocationType) -> Result<Self> {
        Self::new(location_type, None)
    }

    pub fn location_type(&self) -> LocationType {
        self.location_type
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }
}

/// An ephemeral guest context derived from a QR token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unguessable id handed to the guest device.
    pub guest_session_id: Uuid,
    pub qr_token: String,
    pub tenant_id: Uuid,
    #[serde(flatten)]
    pub location: Location,
    /// Services reachable from this session, fixed at resolution time.
    pub enabled_services: BTreeSet<ServiceType>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session valid for [`SESSION_TTL_HOURS`].
    pub fn new(
        qr_token: impl Into<String>,
        tenant_id: Uuid,
        location: Location,
        enabled_services: BTreeSet<ServiceType>,
    ) -> Self {
        Self::issued_at(qr_token, tenant_id, location, enabled_services, Utc::now())
    }

    pub fn issued_at(
        qr_token: impl Into<String>,
        tenant_id: Uuid,
        location: Location,
        enabled_services: BTreeSet<ServiceType>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            guest_session_id: Uuid::new_v4(),
            qr_token: qr_token.into(),
            tenant_id,
            location,
            enabled_services,
            created_at,
            expires_at: created_at + Duration::hours(SESSION_TTL_HOURS),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Fails closed once the validity window has passed.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_expired() {
            return Err(Error::SessionExpired {
                expired_at: self.expires_at,
            });
        }
        Ok(())
    }

    /// Whether a request of this type may be created from the session.
    pub fn allows(&self, service: ServiceType) -> bool {
        service.is_always_available() || self.enabled_services.contains(&service)
    }

    pub fn room_id(&self) -> Option<&str> {
        self.location.room_id()
    }
}
