//! Request desk: the write path shared by guest and staff routes.
//!
//! Every successful write is published on the change bus after it has been
//! committed. Publishing cannot fail the write.

use portal_core::{
    Error, NewServiceRequest, RequestChange, Result, ServiceRequest, Session, StatusUpdate,
};
use realtime::ChangeBus;
use request_store::RequestStore;
use std::sync::Arc;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct RequestDesk {
    store: Arc<dyn RequestStore>,
    bus: Arc<ChangeBus>,
}

impl RequestDesk {
    pub fn new(store: Arc<dyn RequestStore>, bus: Arc<ChangeBus>) -> Self {
        Self { store, bus }
    }

    pub fn store(&self) -> &Arc<dyn RequestStore> {
        &self.store
    }

    pub fn bus(&self) -> &Arc<ChangeBus> {
        &self.bus
    }

    /// Creates a request on behalf of a guest session.
    pub async fn submit(&self, session: &Session, command: NewServiceRequest) -> Result<ServiceRequest> {
        let start = Instant::now();
        let service = command.service_type();

        match self.store.create(session, command).await {
            Ok(request) => {
                metrics().requests_created.inc();
                metrics()
                    .create_latency_ms
                    .observe(start.elapsed().as_millis() as u64);
                let receivers = self.bus.publish(RequestChange::created(request.clone()));
                debug!(request_id = %request.id, receivers, "Fanned out new request");
                Ok(request)
            }
            Err(e) => {
                metrics().requests_rejected.inc();
                warn!(
                    session_id = %session.guest_session_id,
                    service = %service,
                    code = e.code(),
                    error = %e,
                    "Request rejected"
                );
                Err(e)
            }
        }
    }

    /// Applies a staff status change.
    pub async fn update_status(&self, request_id: Uuid, update: StatusUpdate) -> Result<ServiceRequest> {
        match self.store.update_status(request_id, update).await {
            Ok(request) => {
                metrics().status_updates.inc();
                info!(
                    request_id = %request.id,
                    tenant_id = %request.tenant_id,
                    status = %request.status,
                    revision = request.revision,
                    "Request status updated"
                );
                self.bus.publish(RequestChange::updated(request.clone()));
                Ok(request)
            }
            Err(e) => {
                if matches!(e, Error::InvalidTransition { .. }) {
                    metrics().invalid_transitions.inc();
                }
                warn!(request_id = %request_id, error = %e, "Status update rejected");
                Err(e)
            }
        }
    }

    pub async fn list_for_session(&self, session: &Session) -> Result<Vec<ServiceRequest>> {
        self.store.list_for_session(session.guest_session_id).await
    }

    pub async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<ServiceRequest>> {
        self.store.list_for_tenant(tenant_id).await
    }
}
