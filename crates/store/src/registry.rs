//! Registry of issued guest sessions.

use crate::config::SessionConfig;
use moka::future::Cache;
use portal_core::limits::SESSION_TTL_HOURS;
use portal_core::Session;
use std::time::Duration;
use uuid::Uuid;

/// Issued sessions keyed by their guest session id.
///
/// Entries outlive the session itself by a grace period so that a device
/// presenting a lapsed id is told the session expired.
#[derive(Clone)]
pub struct SessionRegistry {
    cache: Cache<Uuid, Session>,
}

impl SessionRegistry {
    pub fn new(config: &SessionConfig) -> Self {
        let ttl = Duration::from_secs(SESSION_TTL_HOURS as u64 * 3600 + config.grace_hours * 3600);
        Self {
            cache: Cache::builder()
                .max_capacity(config.capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn insert(&self, session: Session) {
        self.cache.insert(session.guest_session_id, session).await;
    }

    pub async fn get(&self, session_id: Uuid) -> Option<Session> {
        self.cache.get(&session_id).await
    }

    pub async fn invalidate(&self, session_id: Uuid) {
        self.cache.invalidate(&session_id).await;
    }

    /// Evicts entries past their TTL. Returns the remaining entry count.
    pub async fn sweep(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}
