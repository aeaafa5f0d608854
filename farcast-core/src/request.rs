//! Logical and prepared request types.
//!
//! A request goes through two shapes on its way to the wire:
//!
//! 1. [`ApiRequest`] — what the caller describes: a method, an endpoint
//!    template and loose parameters. Never sent as-is.
//! 2. [`PreparedRequest`] — one concrete request with a fully resolved URL,
//!    produced by the expansion collaborator. Only prepared requests may be
//!    dispatched.
//!
//! The two are distinct types, so handing a logical request to dispatch is
//! a compile error. A `PreparedRequest` additionally carries a private
//! `prepared` discriminator set by expansion, so a hand-assembled request
//! that never went through expansion is rejected at runtime instead of
//! silently sent.

use std::collections::HashMap;
use std::sync::Arc;

use http::{HeaderMap, Method};
use serde_json::Value;
use smol_str::SmolStr;

/// A logical request as described by the caller.
///
/// Holds an endpoint *template* (e.g. `/markets/{region_id}/orders/`) and
/// two parameter sets: structured `params` (path and query values) and
/// free-form `extra` keywords. Expansion resolves these into one or more
/// [`PreparedRequest`]s; once handed over, the logical request is not
/// mutated again.
///
/// # Example
///
/// ```
/// use farcast_core::ApiRequest;
/// use http::Method;
///
/// let request = ApiRequest::new(Method::GET, "/markets/{region_id}/orders/")
///     .param("region_id", 10000002)
///     .param("type_id", 34);
/// assert_eq!(request.endpoint(), "/markets/{region_id}/orders/");
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: SmolStr,
    params: HashMap<SmolStr, Value>,
    extra: HashMap<SmolStr, Value>,
    headers: HeaderMap,
}

impl ApiRequest {
    /// Creates a logical request for the given method and endpoint template.
    pub fn new(method: Method, endpoint: impl Into<SmolStr>) -> Self {
        ApiRequest {
            method,
            endpoint: endpoint.into(),
            params: HashMap::new(),
            extra: HashMap::new(),
            headers: HeaderMap::new(),
        }
    }

    /// Adds a structured parameter (path or query value).
    pub fn param(mut self, name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds a free-form keyword parameter.
    ///
    /// Structured parameters take precedence over keywords with the same
    /// name during lookup.
    pub fn extra(mut self, name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Sets a request header.
    pub fn header(mut self, name: http::header::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The endpoint template this request addresses.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Structured parameters.
    pub fn params(&self) -> &HashMap<SmolStr, Value> {
        &self.params
    }

    /// Free-form keyword parameters.
    pub fn extras(&self) -> &HashMap<SmolStr, Value> {
        &self.extra
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Looks up a parameter by name, structured set first.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.params.get(name).or_else(|| self.extra.get(name))
    }
}

/// One concrete, sendable request.
///
/// Produced exactly once per parameter combination by the expansion
/// collaborator and consumed exactly once by dispatch. Carries a shared
/// back-reference to the originating [`ApiRequest`] for diagnostics; the
/// origin is never mutated through it.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
    route: SmolStr,
    params: HashMap<SmolStr, Value>,
    extra: HashMap<SmolStr, Value>,
    origin: Option<Arc<ApiRequest>>,
    prepared: bool,
}

impl PreparedRequest {
    /// Assembles a request from its parts.
    ///
    /// The result is *not* yet marked prepared; expansion implementations
    /// call [`mark_prepared`](Self::mark_prepared) as their final step.
    /// Dispatch refuses unmarked requests.
    pub fn build(method: Method, url: impl Into<String>, route: impl Into<SmolStr>) -> Self {
        PreparedRequest {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            route: route.into(),
            params: HashMap::new(),
            extra: HashMap::new(),
            origin: None,
            prepared: false,
        }
    }

    /// Attaches the originating logical request, copying its headers and
    /// both parameter sets.
    pub fn with_origin(mut self, origin: Arc<ApiRequest>) -> Self {
        self.headers = origin.headers().clone();
        self.params = origin.params().clone();
        self.extra = origin.extras().clone();
        self.origin = Some(origin);
        self
    }

    /// Marks this request as produced by expansion.
    pub fn mark_prepared(mut self) -> Self {
        self.prepared = true;
        self
    }

    /// Whether this request went through expansion.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The fully resolved URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The endpoint template this request was expanded from, used for
    /// route-level health lookups.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the headers, for conditional-header injection.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The originating logical request, if any. Diagnostics only.
    pub fn origin(&self) -> Option<&Arc<ApiRequest>> {
        self.origin.as_ref()
    }

    /// Looks up a parameter by name, structured set first.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.params.get(name).or_else(|| self.extra.get(name))
    }

    /// All arguments of this request, for blocked-request logging.
    pub fn arguments(&self) -> impl Iterator<Item = (&SmolStr, &Value)> {
        self.params.iter().chain(
            self.extra
                .iter()
                .filter(|(name, _)| !self.params.contains_key(*name)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_params_take_precedence() {
        let request = ApiRequest::new(Method::GET, "/universe/types/{type_id}/")
            .param("type_id", 34)
            .extra("type_id", 999);
        assert_eq!(request.argument("type_id"), Some(&Value::from(34)));
    }

    #[test]
    fn built_request_is_not_prepared() {
        let request = PreparedRequest::build(Method::GET, "https://api.example.net/a", "/a");
        assert!(!request.is_prepared());
        assert!(request.mark_prepared().is_prepared());
    }

    #[test]
    fn origin_parameters_are_copied() {
        let origin = Arc::new(
            ApiRequest::new(Method::GET, "/markets/{region_id}/orders/")
                .param("region_id", 10000002)
                .extra("type_id", 34),
        );
        let prepared =
            PreparedRequest::build(Method::GET, "https://api.example.net/markets/", "/markets/")
                .with_origin(origin);
        assert_eq!(prepared.argument("region_id"), Some(&Value::from(10000002)));
        assert_eq!(prepared.argument("type_id"), Some(&Value::from(34)));
    }
}
