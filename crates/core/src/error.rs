//! Unified error types for the guest portal engine.
//!
//! Error codes:
//! - SESSION_001-002: Session resolution errors
//! - SERVICE_001: Service gating errors
//! - REQUEST_001-002: Request lifecycle errors
//! - VALID_001: Payload validation errors
//! - TENANT_001: Tenant scoping errors
//! - CHANNEL_001: Real-time channel degradation
//! - RATE_001: Submission throttling

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::request::{RequestStatus, ServiceType};

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the guest portal engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid, unknown or garbled QR token / session id.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The session (or the QR code it came from) has lapsed.
    #[error("session expired at {expired_at}")]
    SessionExpired { expired_at: DateTime<Utc> },

    #[error("service not enabled: {0}")]
    ServiceNotEnabled(ServiceType),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("request not found: {0}")]
    RequestNotFound(Uuid),

    /// Missing or malformed fields in a flow payload.
    #[error("validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("tenant mismatch: session belongs to another tenant")]
    TenantMismatch,

    /// Push channel degraded. Never fatal for create/list.
    #[error("channel unavailable: {0}")]
    ChannelUnavailable(String),

    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<u64>,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn session_not_found(msg: impl Into<String>) -> Self {
        Self::SessionNotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(vec![msg.into()])
    }

    pub fn channel_unavailable(msg: impl Into<String>) -> Self {
        Self::ChannelUnavailable(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimited {
            message: msg.into(),
            retry_after,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "SESSION_001",
            Self::SessionExpired { .. } => "SESSION_002",
            Self::ServiceNotEnabled(_) => "SERVICE_001",
            Self::InvalidTransition { .. } => "REQUEST_001",
            Self::RequestNotFound(_) => "REQUEST_002",
            Self::ValidationFailed(_) | Self::Serialization(_) => "VALID_001",
            Self::TenantMismatch => "TENANT_001",
            Self::ChannelUnavailable(_) => "CHANNEL_001",
            Self::RateLimited { .. } => "RATE_001",
            Self::Internal(_) => "INTERNAL_001",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::SessionNotFound(_) => 404,
            Self::SessionExpired { .. } => 410,
            Self::ServiceNotEnabled(_) => 403,
            Self::InvalidTransition { .. } => 409,
            Self::RequestNotFound(_) => 404,
            Self::ValidationFailed(_) | Self::Serialization(_) => 422,
            Self::TenantMismatch => 403,
            Self::ChannelUnavailable(_) => 503,
            Self::RateLimited { .. } => 429,
            Self::Internal(_) => 500,
        }
    }

    /// Whether the condition recovers on its own (callers retry with backoff).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ChannelUnavailable(_) | Self::RateLimited { .. })
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();
        Self::ValidationFailed(messages)
    }
}
