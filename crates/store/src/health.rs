//! Store health checks.

use crate::store::RequestStore;
use tracing::{debug, error};

/// Check request store health.
pub async fn check_store(store: &dyn RequestStore) -> bool {
    if store.is_healthy().await {
        debug!("Request store healthy");
        true
    } else {
        error!("Request store health check failed");
        false
    }
}
