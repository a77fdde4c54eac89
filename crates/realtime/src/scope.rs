//! Who a subscription is for.

use portal_core::ServiceRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A guest sees only its own session's requests; staff see the whole tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Scope {
    #[serde(rename_all = "camelCase")]
    Guest { tenant_id: Uuid, session_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Staff { tenant_id: Uuid },
}

impl Scope {
    pub fn guest(tenant_id: Uuid, session_id: Uuid) -> Self {
        Self::Guest {
            tenant_id,
            session_id,
        }
    }

    pub fn staff(tenant_id: Uuid) -> Self {
        Self::Staff { tenant_id }
    }

    pub fn tenant_id(&self) -> Uuid {
        match self {
            Self::Guest { tenant_id, .. } | Self::Staff { tenant_id } => *tenant_id,
        }
    }

    pub fn matches(&self, request: &ServiceRequest) -> bool {
        match self {
            Self::Guest {
                tenant_id,
                session_id,
            } => request.tenant_id == *tenant_id && request.session_id == *session_id,
            Self::Staff { tenant_id } => request.tenant_id == *tenant_id,
        }
    }
}
