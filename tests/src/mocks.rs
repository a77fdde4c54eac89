//! Mock implementations for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use portal_core::{NewServiceRequest, Result, ServiceRequest, Session, StatusUpdate};
use request_store::{MemoryStore, RequestStore};
use std::sync::Arc;
use uuid::Uuid;

/// Store double with failure injection.
///
/// Delegates to a real [`MemoryStore`] so the validation and ordering rules
/// under test are the production ones, and records every creation command
/// it accepted.
#[derive(Clone)]
pub struct MockStore {
    inner: Arc<MemoryStore>,
    /// Commands that reached the store and succeeded.
    created: Arc<Mutex<Vec<Uuid>>>,
    /// Simulate an unreachable backend if set.
    should_fail: Arc<Mutex<bool>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryStore::new()),
            created: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Ids of requests created through this store, in call order.
    pub fn created_ids(&self) -> Vec<Uuid> {
        self.created.lock().clone()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    fn check(&self) -> Result<()> {
        if *self.should_fail.lock() {
            return Err(portal_core::Error::internal("Mock store failure"));
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestStore for MockStore {
    async fn create(&self, session: &Session, command: NewServiceRequest) -> Result<ServiceRequest> {
        self.check()?;
        let request = self.inner.create(session, command).await?;
        self.created.lock().push(request.id);
        Ok(request)
    }

    async fn list_for_session(&self, session_id: Uuid) -> Result<Vec<ServiceRequest>> {
        self.check()?;
        self.inner.list_for_session(session_id).await
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<ServiceRequest>> {
        self.check()?;
        self.inner.list_for_tenant(tenant_id).await
    }

    async fn get(&self, request_id: Uuid) -> Result<ServiceRequest> {
        self.check()?;
        self.inner.get(request_id).await
    }

    async fn update_status(&self, request_id: Uuid, update: StatusUpdate) -> Result<ServiceRequest> {
        self.check()?;
        self.inner.update_status(request_id, update).await
    }

    async fn is_healthy(&self) -> bool {
        !*self.should_fail.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_mode() {
        let store = MockStore::new();
        assert!(store.is_healthy().await);

        store.set_should_fail(true);
        assert!(!store.is_healthy().await);
        assert!(store.list_for_tenant(Uuid::new_v4()).await.is_err());

        store.set_should_fail(false);
        assert!(store.list_for_tenant(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
