use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use farcast_core::CacheValue;
use serde::{Serialize, de::DeserializeOwned};

use crate::{BackendError, DeleteStatus};

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Raw storage operations over serialized values.
///
/// Implementations store opaque bytes under string keys with an optional
/// per-key TTL. Expiry enforcement on read is the backend's job: an
/// expired entry must never be returned.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Reads the value stored under `key`, if present and unexpired.
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Bytes>>>;

    /// Writes `value` under `key`.
    ///
    /// An explicit `ttl` overrides the expiry carried by the value itself.
    async fn write(
        &self,
        key: &str,
        value: CacheValue<Bytes>,
        ttl: Option<Duration>,
    ) -> BackendResult<()>;

    /// Removes the value stored under `key`.
    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus>;
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Bytes>>> {
        (**self).read(key).await
    }

    async fn write(
        &self,
        key: &str,
        value: CacheValue<Bytes>,
        ttl: Option<Duration>,
    ) -> BackendResult<()> {
        (**self).write(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend> {
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Bytes>>> {
        (**self).read(key).await
    }

    async fn write(
        &self,
        key: &str,
        value: CacheValue<Bytes>,
        ttl: Option<Duration>,
    ) -> BackendResult<()> {
        (**self).write(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }
}

/// Typed cache operations layered over [`Backend`].
///
/// `get` and `set` move structured values through JSON, so any
/// `Serialize`/`Deserialize` type can be stored without the caller
/// touching the byte representation.
pub trait CacheBackend: Backend {
    /// Reads and deserializes the value stored under `key`.
    fn get<T>(&self, key: &str) -> impl Future<Output = BackendResult<Option<CacheValue<T>>>> + Send
    where
        T: DeserializeOwned,
    {
        async move {
            match self.read(key).await? {
                Some(raw) => {
                    let (data, expire) = (raw.data().clone(), raw.expire());
                    let value: T = serde_json::from_slice(&data)?;
                    Ok(Some(CacheValue::new(value, expire)))
                }
                None => Ok(None),
            }
        }
    }

    /// Serializes and writes `value` under `key` with the given TTL.
    fn set<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> impl Future<Output = BackendResult<()>> + Send
    where
        T: Serialize + Sync,
    {
        async move {
            let serialized = serde_json::to_vec(value)?;
            let cache_value = match ttl {
                Some(ttl) => CacheValue::with_ttl(Bytes::from(serialized), ttl),
                None => CacheValue::new(Bytes::from(serialized), None),
            };
            self.write(key, cache_value, ttl).await
        }
    }

    /// Deletes the value stored under `key`.
    fn delete(&self, key: &str) -> impl Future<Output = BackendResult<DeleteStatus>> + Send {
        async move { self.remove(key).await }
    }
}

impl CacheBackend for Box<dyn Backend> {}

impl CacheBackend for Arc<dyn Backend> {}
