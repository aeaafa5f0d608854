//! Materialized responses and their cacheable form.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use http::{HeaderMap, StatusCode, header};
use serde::{Deserialize, Serialize};

use crate::request::PreparedRequest;

/// A materialized API response.
///
/// Built once per dispatched (or synthesized) request and immutable after
/// construction. The optional back-reference to the producing
/// [`PreparedRequest`] exists for diagnostics; requests and responses have
/// independent lifetimes once dispatch returns.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    reason: Option<String>,
    url: String,
    text: String,
    expires: Option<DateTime<Utc>>,
    request: Option<Arc<PreparedRequest>>,
}

impl ApiResponse {
    /// Builds a response from its wire parts.
    ///
    /// The `expires` field is derived from the `Expires` header at
    /// construction time and fixed thereafter.
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        reason: Option<String>,
        url: impl Into<String>,
        text: impl Into<String>,
        request: Option<Arc<PreparedRequest>>,
    ) -> Self {
        let expires = parse_expires(&headers);
        ApiResponse {
            status,
            headers,
            reason,
            url: url.into(),
            text: text.into(),
            expires,
            request,
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The reason phrase, when known.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// The resolved URL this response was served from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw body text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// When the response content expires, as announced by the server.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// The request that produced this response, if it came off the wire.
    ///
    /// Responses recovered from the conditional cache or synthesized by a
    /// fallback hook have no producing request.
    pub fn request(&self) -> Option<&Arc<PreparedRequest>> {
        self.request.as_ref()
    }

    /// The entity tag announced by the server, if any.
    pub fn etag(&self) -> Option<&str> {
        self.headers
            .get(header::ETAG)
            .and_then(|value| value.to_str().ok())
    }

    /// Deserializes the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.text)
    }

    /// How long this response may be cached, per its own expiry signal.
    ///
    /// `None` when the server sent no usable signal or the content already
    /// expired; callers fall back to their configured default.
    pub fn freshness_lifetime(&self) -> Option<Duration> {
        let expires = self.expires?;
        let remaining = expires.signed_duration_since(Utc::now());
        if remaining.num_seconds() > 0 {
            Some(Duration::from_secs(remaining.num_seconds() as u64))
        } else {
            None
        }
    }

    /// Converts to the serializable form stored by the conditional cache.
    pub fn to_cached(&self) -> CachedResponse {
        CachedResponse {
            status: self.status,
            headers: self.headers.clone(),
            reason: self.reason.clone(),
            url: self.url.clone(),
            text: self.text.clone(),
        }
    }

    /// Rebuilds a response from its cached form.
    ///
    /// The `expires` field is re-derived from the stored headers; the
    /// request back-reference is gone.
    pub fn from_cached(cached: CachedResponse) -> Self {
        ApiResponse::new(
            cached.status,
            cached.headers,
            cached.reason,
            cached.url,
            cached.text,
            None,
        )
    }
}

/// The serializable twin of [`ApiResponse`].
///
/// Status and header map serialize through `http-serde`; everything else
/// is plain data. Stored by the conditional response cache and compared
/// structurally in tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    #[serde(with = "http_serde::status_code")]
    status: StatusCode,
    #[serde(with = "http_serde::header_map")]
    headers: HeaderMap,
    reason: Option<String>,
    url: String,
    text: String,
}

impl CachedResponse {
    /// The stored status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The stored body text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The stored resolved URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn parse_expires(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let raw = headers.get(header::EXPIRES)?.to_str().ok()?;
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
