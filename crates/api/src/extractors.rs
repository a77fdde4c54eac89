//! Request extractors.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use portal_core::{Error, Session};
use serde::Deserialize;
use uuid::Uuid;

use crate::response::ApiError;
use crate::state::AppState;

/// Header carrying the guest session id.
pub const SESSION_HEADER: &str = "X-Guest-Session";

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session: Option<String>,
}

/// Raw session id presented by the client, if any. Header first, then
/// `?session=` (browsers cannot set headers on a WebSocket upgrade).
fn presented_session(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(SESSION_HEADER) {
        return value.to_str().ok().map(|v| v.trim().to_string());
    }
    Query::<SessionQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.session)
}

fn parse_session_id(raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|_| Error::session_not_found("malformed guest session id"))
}

/// A validated, unexpired guest session.
///
/// The client only presents an id; tenant, location and enabled services
/// always come from the registry.
#[derive(Debug, Clone)]
pub struct GuestSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for GuestSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = presented_session(parts)
            .ok_or_else(|| Error::session_not_found("guest session is required"))?;
        let session_id = parse_session_id(&raw)?;
        let session = state.resolver.session(session_id).await?;
        Ok(GuestSession(session))
    }
}

/// Session id a device already holds, used to resume instead of re-issue.
/// Malformed ids are ignored.
#[derive(Debug, Clone, Copy)]
pub struct HeldSession(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for HeldSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(HeldSession(
            presented_session(parts).and_then(|raw| parse_session_id(&raw).ok()),
        ))
    }
}
