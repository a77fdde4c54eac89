//! Request store: the authoritative collection of service requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use portal_core::{
    Error, NewServiceRequest, RequestDetails, RequestStatus, Result, ServiceRequest, Session,
    StatusUpdate,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Source of "now". Swappable so tests can skew the clock.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Storage seam for service requests.
///
/// Every listing is the full set, newest first. Implementations must be
/// safe under concurrent writers; the API never retries a failed call.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Validates and stores a new request with `status = pending`.
    async fn create(&self, session: &Session, command: NewServiceRequest) -> Result<ServiceRequest>;

    /// All requests created by one guest session.
    async fn list_for_session(&self, session_id: Uuid) -> Result<Vec<ServiceRequest>>;

    /// All requests of one tenant, for staff dashboards.
    async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<ServiceRequest>>;

    async fn get(&self, request_id: Uuid) -> Result<ServiceRequest>;

    /// Applies a staff status change. Last writer wins.
    async fn update_status(&self, request_id: Uuid, update: StatusUpdate) -> Result<ServiceRequest>;

    /// Whether the backing storage is reachable.
    async fn is_healthy(&self) -> bool;
}

struct Entry {
    /// Insertion order, breaks `created_at` ties.
    seq: u64,
    request: ServiceRequest,
}

#[derive(Default)]
struct Inner {
    requests: HashMap<Uuid, Entry>,
    by_session: HashMap<Uuid, Vec<Uuid>>,
    by_tenant: HashMap<Uuid, Vec<Uuid>>,
    next_seq: u64,
}

impl Inner {
    fn collect(&self, ids: Option<&Vec<Uuid>>) -> Vec<ServiceRequest> {
        let mut entries: Vec<&Entry> = ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.requests.get(id))
            .collect();
        entries.sort_by(|a, b| {
            b.request
                .created_at
                .cmp(&a.request.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|e| e.request.clone()).collect()
    }

    /// Feedback must rate a completed request of the same session.
    fn check_feedback_target(&self, session: &Session, target: Uuid) -> Result<()> {
        let rated = self
            .requests
            .get(&target)
            .map(|e| &e.request)
            .filter(|r| r.session_id == session.guest_session_id);
        match rated {
            Some(r) if r.status == RequestStatus::Completed => Ok(()),
            Some(r) => Err(Error::validation(format!(
                "requestId: request is {}, only completed requests can be rated",
                r.status
            ))),
            None => Err(Error::validation(
                "requestId: no such request in this session",
            )),
        }
    }
}

/// In-memory authoritative store.
///
/// One `parking_lot` lock guards all indexes; it is never held across an
/// await point.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    clock: Clock,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn create(&self, session: &Session, command: NewServiceRequest) -> Result<ServiceRequest> {
        // Expiry is checked before anything about the payload.
        session.ensure_active()?;

        if command.session_id != session.guest_session_id {
            return Err(Error::session_not_found("command does not belong to this session"));
        }
        if command.tenant_id != session.tenant_id {
            warn!(
                session_id = %session.guest_session_id,
                tenant_id = %command.tenant_id,
                "Rejected cross-tenant request"
            );
            return Err(Error::TenantMismatch);
        }

        let service = command.service_type();
        if !session.allows(service) {
            return Err(Error::ServiceNotEnabled(service));
        }
        command.details.validate_payload()?;

        let now = self.now();
        let title = command.resolved_title();
        let request = ServiceRequest {
            id: Uuid::new_v4(),
            tenant_id: session.tenant_id,
            session_id: session.guest_session_id,
            room_id: session.room_id().map(str::to_string),
            location_type: session.location.location_type(),
            eta_minutes: command.details.eta_minutes(),
            details: command.details,
            status: RequestStatus::Pending,
            title,
            created_at: now,
            updated_at: now,
            assigned_staff: None,
            revision: 1,
        };

        let mut inner = self.inner.write();
        if let RequestDetails::Feedback(ref entry) = request.details {
            inner.check_feedback_target(session, entry.request_id)?;
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .by_session
            .entry(request.session_id)
            .or_default()
            .push(request.id);
        inner
            .by_tenant
            .entry(request.tenant_id)
            .or_default()
            .push(request.id);
        inner.requests.insert(
            request.id,
            Entry {
                seq,
                request: request.clone(),
            },
        );
        drop(inner);

        info!(
            request_id = %request.id,
            tenant_id = %request.tenant_id,
            service = %service,
            "Created service request"
        );
        Ok(request)
    }

    async fn list_for_session(&self, session_id: Uuid) -> Result<Vec<ServiceRequest>> {
        let inner = self.inner.read();
        Ok(inner.collect(inner.by_session.get(&session_id)))
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<ServiceRequest>> {
        let inner = self.inner.read();
        Ok(inner.collect(inner.by_tenant.get(&tenant_id)))
    }

    async fn get(&self, request_id: Uuid) -> Result<ServiceRequest> {
        self.inner
            .read()
            .requests
            .get(&request_id)
            .map(|e| e.request.clone())
            .ok_or(Error::RequestNotFound(request_id))
    }

    async fn update_status(&self, request_id: Uuid, update: StatusUpdate) -> Result<ServiceRequest> {
        let now = self.now();
        let mut inner = self.inner.write();
        let entry = inner
            .requests
            .get_mut(&request_id)
            .ok_or(Error::RequestNotFound(request_id))?;

        let from = entry.request.status;
        entry.request.apply(&update, now)?;
        debug!(
            request_id = %request_id,
            from = %from,
            to = %entry.request.status,
            revision = entry.request.revision,
            "Applied status update"
        );
        Ok(entry.request.clone())
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}
