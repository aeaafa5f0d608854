//! Entity-tag keyed conditional response cache.

use std::sync::Arc;
use std::time::Duration;

use farcast_backend::{Backend, CacheBackend};
use farcast_core::{ApiResponse, CacheValue, CachedResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Entity tag stored when the server omitted one.
pub const MISSING_ETAG: &str = "*";

/// One conditional-cache line: the entity tag and the last known good
/// response for a URL.
///
/// Keyed by URL only; header variations are not distinguished. An entry
/// exists only if the response that produced it was successful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtagEntry {
    /// Entity tag to send in the next conditional request.
    pub etag: String,
    /// The response to recover when the server reports Not Modified.
    pub response: CachedResponse,
}

/// Conditional response cache over the generic TTL backend.
pub struct EtagCache {
    backend: Arc<dyn Backend>,
}

impl EtagCache {
    /// Creates a cache over the given backend.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        EtagCache { backend }
    }

    /// Returns the cache line for `url`, if one is stored and unexpired.
    pub async fn lookup(&self, url: &str) -> Result<Option<EtagEntry>> {
        let entry = self
            .backend
            .get::<EtagEntry>(&cache_key(url))
            .await?
            .map(CacheValue::into_inner);
        Ok(entry)
    }

    /// Stores the cache line for `url` with the given lifetime.
    ///
    /// Callers only store successful responses; a missing server etag is
    /// recorded as [`MISSING_ETAG`].
    pub async fn store(
        &self,
        url: &str,
        etag: &str,
        response: &ApiResponse,
        ttl: Duration,
    ) -> Result<()> {
        let entry = EtagEntry {
            etag: etag.to_owned(),
            response: response.to_cached(),
        };
        self.backend
            .set(&cache_key(url), &entry, Some(ttl))
            .await?;
        debug!(url, etag, ttl = ?ttl, "conditional cache entry stored");
        Ok(())
    }
}

fn cache_key(url: &str) -> String {
    format!("etag:{url}")
}
