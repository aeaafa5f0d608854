//! In-memory backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use farcast_core::CacheValue;
use smol_str::SmolStr;

use crate::{Backend, BackendResult, CacheBackend, DeleteStatus};

/// In-process cache backend over a concurrent hash map.
///
/// Entries carry their own expiry instant; expiry is enforced lazily on
/// read, so an expired entry occupies memory until the next lookup touches
/// it. Data is not persisted and not shared across processes.
///
/// Cloning is cheap in the usual way: wrap the backend in an `Arc` and
/// share the handle.
///
/// # Example
///
/// ```
/// use farcast_backend::MemoryBackend;
///
/// let backend = MemoryBackend::new();
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<SmolStr, CacheValue<Bytes>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (possibly expired-but-unswept) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the backend holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Bytes>>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.clone()));
        }
        Ok(None)
    }

    async fn write(
        &self,
        key: &str,
        value: CacheValue<Bytes>,
        ttl: Option<Duration>,
    ) -> BackendResult<()> {
        let value = match ttl {
            Some(ttl) => {
                let expire = chrono::Duration::from_std(ttl)
                    .ok()
                    .and_then(|ttl| Utc::now().checked_add_signed(ttl));
                CacheValue::new(value.into_inner(), expire)
            }
            None => value,
        };
        self.entries.insert(SmolStr::new(key), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus> {
        match self.entries.remove(key) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }
}

impl CacheBackend for MemoryBackend {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Verdict {
        valid: bool,
        checked: u32,
    }

    #[tokio::test]
    async fn typed_round_trip() {
        let backend = MemoryBackend::new();
        let verdict = Verdict {
            valid: true,
            checked: 3,
        };
        backend
            .set("check:entity_id:34", &verdict, Some(Duration::from_secs(60)))
            .await
            .unwrap();

        let cached = backend
            .get::<Verdict>("check:entity_id:34")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached.data(), &verdict);
        assert!(cached.ttl().is_some());
    }

    #[tokio::test]
    async fn expired_entry_is_dropped_on_read() {
        let backend = MemoryBackend::new();
        let expired = CacheValue::new(
            Bytes::from_static(b"true"),
            Some(Utc::now() - chrono::Duration::seconds(1)),
        );
        backend.write("stale", expired, None).await.unwrap();

        assert!(backend.read("stale").await.unwrap().is_none());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn remove_reports_missing() {
        let backend = MemoryBackend::new();
        assert_eq!(
            backend.remove("absent").await.unwrap(),
            DeleteStatus::Missing
        );
        backend.set("present", &1u8, None).await.unwrap();
        assert_eq!(
            backend.remove("present").await.unwrap(),
            DeleteStatus::Deleted(1)
        );
    }
}
