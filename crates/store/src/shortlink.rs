//! Short marketing links (`/q/:code`).

use crate::config::ShortLinkSeed;
use parking_lot::RwLock;
use portal_core::ShortCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use telemetry::metrics;
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct ShortLink {
    pub code: String,
    pub target: Url,
    clicks: AtomicU64,
}

impl ShortLink {
    pub fn clicks(&self) -> u64 {
        self.clicks.load(Ordering::Relaxed)
    }
}

/// Short-link table with per-link click counters.
#[derive(Debug, Default)]
pub struct ShortLinks {
    links: RwLock<HashMap<String, Arc<ShortLink>>>,
}

impl ShortLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Malformed seed codes are skipped.
    pub fn from_seeds(seeds: &[ShortLinkSeed]) -> Self {
        let links = Self::new();
        for seed in seeds {
            links.insert(&seed.code, seed.target.clone());
        }
        links
    }

    /// Returns false when the code is malformed.
    pub fn insert(&self, code: &str, target: Url) -> bool {
        let Some(code) = ShortCode::parse(code) else {
            return false;
        };
        let link = Arc::new(ShortLink {
            code: code.as_str().to_string(),
            target,
            clicks: AtomicU64::new(0),
        });
        self.links.write().insert(link.code.clone(), link);
        true
    }

    /// Resolves a code and counts the click.
    pub fn follow(&self, raw: &str) -> Option<Url> {
        let code = ShortCode::parse(raw)?;
        let link = self.links.read().get(code.as_str()).cloned()?;
        link.clicks.fetch_add(1, Ordering::Relaxed);
        metrics().shortlink_clicks.inc();
        debug!(code = %link.code, target = %link.target, "Followed short link");
        Some(link.target.clone())
    }

    pub fn get(&self, code: &str) -> Option<Arc<ShortLink>> {
        self.links.read().get(code).cloned()
    }

    pub fn len(&self) -> usize {
        self.links.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
