//! Staff dashboard endpoints.
//!
//! Staff authentication sits in front of this service; handlers trust the
//! tenant in the path.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use portal_core::{Error, ServiceRequest, StatusUpdate};
use uuid::Uuid;

use crate::response::ApiError;
use crate::state::AppState;

/// GET /staff/tenants/:tenant_id/requests
pub async fn list_handler(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Vec<ServiceRequest>>, ApiError> {
    let requests = state.desk.list_for_tenant(tenant_id).await?;
    Ok(Json(requests))
}

/// PATCH /staff/requests/:request_id/status
pub async fn update_status_handler(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ServiceRequest>, ApiError> {
    let update: StatusUpdate = serde_json::from_slice(&body).map_err(Error::from)?;
    let request = state.desk.update_status(request_id, update).await?;
    Ok(Json(request))
}
