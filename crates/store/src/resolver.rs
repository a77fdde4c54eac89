//! QR token to guest session resolution.

use crate::directory::Directory;
use crate::registry::SessionRegistry;
use chrono::Utc;
use portal_core::{Error, HotelConfig, QrToken, Result, Session};
use serde::Serialize;
use std::sync::Arc;
use telemetry::metrics;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A resolved session plus the hotel it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSession {
    pub session: Session,
    pub hotel: HotelConfig,
}

/// Turns untrusted QR tokens into registered sessions.
///
/// There is no default tenant or location: anything that does not resolve
/// cleanly is an error.
#[derive(Clone)]
pub struct SessionResolver {
    directory: Arc<dyn Directory>,
    registry: SessionRegistry,
}

impl SessionResolver {
    pub fn new(directory: Arc<dyn Directory>, registry: SessionRegistry) -> Self {
        Self {
            directory,
            registry,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Issues a fresh session for a scanned token.
    pub async fn resolve(&self, raw_token: &str) -> Result<ResolvedSession> {
        let result = self.issue(raw_token).await;
        match &result {
            Ok(resolved) => {
                metrics().sessions_resolved.inc();
                info!(
                    session_id = %resolved.session.guest_session_id,
                    tenant_id = %resolved.session.tenant_id,
                    location = ?resolved.session.location.location_type(),
                    "Resolved guest session"
                );
            }
            Err(e) => {
                metrics().sessions_failed.inc();
                debug!(error = %e, "QR resolution failed");
            }
        }
        result
    }

    /// Returns the device's existing session when it is still valid for the
    /// same token and the code itself is still live, otherwise resolves the
    /// token from scratch (which fails for a retired or expired code).
    pub async fn resume(&self, session_id: Option<Uuid>, raw_token: &str) -> Result<ResolvedSession> {
        if let Some(id) = session_id {
            if let Some(existing) = self.registry.get(id).await {
                if !existing.is_expired() && self.code_still_live(raw_token, &existing).await? {
                    let hotel = self.hotel(existing.tenant_id).await?;
                    metrics().sessions_resumed.inc();
                    debug!(session_id = %id, "Resumed guest session");
                    return Ok(ResolvedSession {
                        session: existing,
                        hotel,
                    });
                }
            }
        }
        self.resolve(raw_token).await
    }

    async fn code_still_live(&self, raw_token: &str, session: &Session) -> Result<bool> {
        let Ok(token) = QrToken::parse(raw_token) else {
            return Ok(false);
        };
        if token.as_str() != session.qr_token {
            return Ok(false);
        }
        Ok(self
            .directory
            .qr_code(&token)
            .await?
            .is_some_and(|code| {
                code.active && !code.is_expired_at(Utc::now()) && code.tenant_id == session.tenant_id
            }))
    }

    /// Validates a client-supplied session id.
    pub async fn session(&self, session_id: Uuid) -> Result<Session> {
        let session = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| Error::session_not_found("unknown guest session"))?;
        session.ensure_active()?;
        Ok(session)
    }

    pub async fn hotel(&self, tenant_id: Uuid) -> Result<HotelConfig> {
        self.directory.hotel(tenant_id).await?.ok_or_else(|| {
            warn!(tenant_id = %tenant_id, "QR code references a missing hotel");
            Error::session_not_found("unknown hotel")
        })
    }

    async fn issue(&self, raw_token: &str) -> Result<ResolvedSession> {
        let token = QrToken::parse(raw_token)?;
        let code = self
            .directory
            .qr_code(&token)
            .await?
            .ok_or_else(|| Error::session_not_found("unknown QR code"))?;

        if !code.active {
            return Err(Error::session_not_found("QR code is no longer active"));
        }
        if let Some(expired_at) = code.expires_at.filter(|_| code.is_expired_at(Utc::now())) {
            return Err(Error::SessionExpired { expired_at });
        }

        let hotel = self.hotel(code.tenant_id).await?;
        let services = hotel.services_for(code.services.as_ref());
        let session = Session::new(token.as_str(), code.tenant_id, code.location, services);
        self.registry.insert(session.clone()).await;

        Ok(ResolvedSession { session, hotel })
    }
}
