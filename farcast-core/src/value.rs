//! Cached value wrapper with expiration metadata.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached value with an optional expiration timestamp.
///
/// Wraps any data type `T` together with the instant after which the value
/// must no longer be served. Backends store and return `CacheValue`s; the
/// expiry check itself is the backend's job on read.
///
/// # Example
///
/// ```
/// use farcast_core::CacheValue;
/// use std::time::Duration;
///
/// let value = CacheValue::with_ttl("payload", Duration::from_secs(60));
/// assert!(!value.is_expired());
/// assert_eq!(value.data(), &"payload");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheValue<T> {
    data: T,
    expire: Option<DateTime<Utc>>,
}

impl<T> CacheValue<T> {
    /// Creates a new cache value with the given data and expiry instant.
    pub fn new(data: T, expire: Option<DateTime<Utc>>) -> Self {
        CacheValue { data, expire }
    }

    /// Creates a cache value expiring `ttl` from now.
    ///
    /// A lifetime too large to represent leaves the value without an
    /// expiry.
    pub fn with_ttl(data: T, ttl: Duration) -> Self {
        let expire = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        CacheValue { data, expire }
    }

    /// Returns a reference to the cached data.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns when the data expires, if an expiry was set.
    #[inline]
    pub fn expire(&self) -> Option<DateTime<Utc>> {
        self.expire
    }

    /// Whether the expiry instant has passed. Values without an expiry
    /// never expire.
    pub fn is_expired(&self) -> bool {
        match self.expire {
            Some(expire) => expire <= Utc::now(),
            None => false,
        }
    }

    /// Consumes the cache value and returns the inner data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Remaining time-to-live, if the value has an expiry in the future.
    pub fn ttl(&self) -> Option<Duration> {
        self.expire.and_then(|expire| {
            let duration = expire.signed_duration_since(Utc::now());
            if duration.num_seconds() > 0 {
                Some(Duration::from_secs(duration.num_seconds() as u64))
            } else {
                None
            }
        })
    }

    /// Maps the cached data, keeping the expiry metadata.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CacheValue<U> {
        CacheValue {
            data: f(self.data),
            expire: self.expire,
        }
    }
}
