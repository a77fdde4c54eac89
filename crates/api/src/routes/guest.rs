//! Guest-facing endpoints: QR resolution and the session's own requests.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use portal_core::{
    limits::MAX_REQUEST_BODY_BYTES, Error, NewServiceRequest, RequestDetails, ServiceRequest,
    ServiceType,
};
use request_store::ResolvedSession;
use serde::Deserialize;
use telemetry::metrics;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::extractors::{GuestSession, HeldSession};
use crate::response::ApiError;
use crate::state::AppState;

/// Creation body. The session id never comes from the body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequestBody {
    tenant_id: Uuid,
    #[serde(default)]
    title: Option<String>,
    #[serde(flatten)]
    details: RequestDetails,
}

/// GET /guest/qr/:token - Resolve (or resume) a session for a scanned code.
pub async fn resolve_handler(
    State(state): State<AppState>,
    HeldSession(held): HeldSession,
    Path(token): Path<String>,
) -> Result<Json<ResolvedSession>, ApiError> {
    let mut resolved = state.resolver.resume(held, &token).await?;

    if !resolved.session.allows(ServiceType::Wifi) {
        resolved.hotel.wifi = None;
    }

    Ok(Json(resolved))
}

/// GET /guest/requests - The session's requests, newest first.
pub async fn list_handler(
    State(state): State<AppState>,
    GuestSession(session): GuestSession,
) -> Result<Json<Vec<ServiceRequest>>, ApiError> {
    let requests = state.desk.list_for_session(&session).await?;
    Ok(Json(requests))
}

/// POST /guest/requests - Submit a flow draft.
pub async fn create_handler(
    State(state): State<AppState>,
    GuestSession(session): GuestSession,
    body: Bytes,
) -> Result<(StatusCode, Json<ServiceRequest>), ApiError> {
    let key = session.guest_session_id.to_string();
    if !state.rate_limiter.check(&key) {
        metrics().rate_limited_requests.inc();
        warn!(session_id = %key, "Request submission throttled");
        return Err(Error::rate_limited(
            "Too many requests from this session",
            Some(state.rate_limiter.config().retry_after_secs()),
        )
        .into());
    }

    if body.len() > MAX_REQUEST_BODY_BYTES {
        return Err(Error::validation(format!(
            "body: {}KB exceeds {}KB limit",
            body.len() / 1024,
            MAX_REQUEST_BODY_BYTES / 1024
        ))
        .into());
    }

    let parsed: CreateRequestBody = serde_json::from_slice(&body).map_err(|e| {
        debug!(session_id = %key, error = %e, "Malformed request body");
        Error::from(e)
    })?;

    let command = NewServiceRequest {
        session_id: session.guest_session_id,
        tenant_id: parsed.tenant_id,
        title: parsed.title,
        details: parsed.details,
    };

    let request = state.desk.submit(&session, command).await?;
    Ok((StatusCode::CREATED, Json(request)))
}
