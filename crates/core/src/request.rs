//! Service request entity and its status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::details::RequestDetails;
use crate::error::{Error, Result};
use crate::session::LocationType;

/// Kind of guest service a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    RoomService,
    Housekeeping,
    Maintenance,
    Wifi,
    Feedback,
}

impl ServiceType {
    pub const ALL: [ServiceType; 5] = [
        Self::RoomService,
        Self::Housekeeping,
        Self::Maintenance,
        Self::Wifi,
        Self::Feedback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoomService => "room-service",
            Self::Housekeeping => "housekeeping",
            Self::Maintenance => "maintenance",
            Self::Wifi => "wifi",
            Self::Feedback => "feedback",
        }
    }

    /// Feedback is reachable from the tracking screen regardless of the
    /// hotel's service switches.
    pub fn is_always_available(&self) -> bool {
        matches!(self, Self::Feedback)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a service request.
///
/// ```text
/// pending -> assigned -> in-progress -> completed*
/// pending | assigned | in-progress -> cancelled*
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Position in the partial order. Both terminal states share the top rank.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Assigned => 1,
            Self::InProgress => 2,
            Self::Completed | Self::Cancelled => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether `self -> next` is allowed.
    ///
    /// Forward skips (e.g. pending -> in-progress) are accepted. A same-status
    /// move on a non-terminal request is a field-only update.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == *self || next.rank() > self.rank()
    }

    /// The single authoritative transition check.
    pub fn validate_transition(&self, next: RequestStatus) -> Result<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A guest-initiated unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub session_id: Uuid,
    pub room_id: Option<String>,
    pub location_type: LocationType,
    #[serde(flatten)]
    pub details: RequestDetails,
    pub status: RequestStatus,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub eta_minutes: Option<u32>,
    pub assigned_staff: Option<String>,
    /// Mutation counter, 1 at creation.
    pub revision: u64,
}

impl ServiceRequest {
    pub fn service_type(&self) -> ServiceType {
        self.details.service_type()
    }

    /// Applies a staff update in place, enforcing the state machine.
    ///
    /// `updated_at` never moves backwards, even if `now` does.
    pub fn apply(&mut self, update: &StatusUpdate, now: DateTime<Utc>) -> Result<()> {
        self.status.validate_transition(update.status)?;

        self.status = update.status;
        if let Some(ref staff) = update.assigned_staff {
            self.assigned_staff = Some(staff.clone());
        }
        if let Some(eta) = update.eta_minutes {
            self.eta_minutes = Some(eta);
        }
        self.updated_at = now.max(self.updated_at);
        self.revision += 1;
        Ok(())
    }
}

/// Normalized creation command handed to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceRequest {
    pub session_id: Uuid,
    pub tenant_id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub details: RequestDetails,
}

impl NewServiceRequest {
    pub fn service_type(&self) -> ServiceType {
        self.details.service_type()
    }

    /// Title supplied by the flow, or one derived from the payload.
    pub fn resolved_title(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.details.default_title())
    }
}

/// Staff-originated status mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: RequestStatus,
    #[serde(default)]
    pub assigned_staff: Option<String>,
    #[serde(default)]
    pub eta_minutes: Option<u32>,
}

impl StatusUpdate {
    pub fn to(status: RequestStatus) -> Self {
        Self {
            status,
            assigned_staff: None,
            eta_minutes: None,
        }
    }

    pub fn with_staff(mut self, staff: impl Into<String>) -> Self {
        self.assigned_staff = Some(staff.into());
        self
    }

    pub fn with_eta(mut self, minutes: u32) -> Self {
        self.eta_minutes = Some(minutes);
        self
    }
}

/// What happened to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
}

/// A change event fanned out to observers. Carries the full entity so
/// observers never need to re-read the store to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestChange {
    pub kind: ChangeKind,
    pub request: ServiceRequest,
}

impl RequestChange {
    pub fn created(request: ServiceRequest) -> Self {
        Self {
            kind: ChangeKind::Created,
            request,
        }
    }

    pub fn updated(request: ServiceRequest) -> Self {
        Self {
            kind: ChangeKind::Updated,
            request,
        }
    }

    pub fn tenant_id(&self) -> Uuid {
        self.request.tenant_id
    }
}
