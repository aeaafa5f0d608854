//! The orchestrating session, the crate's single public entry point.

use std::sync::Arc;

use farcast_backend::{Backend, MemoryBackend};
use farcast_core::{ApiRequest, ApiResponse, PreparedRequest};
use http::Method;
use http::header::{HeaderValue, IF_NONE_MATCH};
use smol_str::SmolStr;
use tracing::debug;

use crate::catalog::{EndpointCatalog, StaticCatalog};
use crate::check::{EndpointHealthCheck, EntityIdCheck, ParamCheck, RequestChecker};
use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::etag::EtagCache;
use crate::expand::{Expand, TemplateExpander};
use crate::fallback::{NeverSubstitute, Substitute};
use crate::reference::{ReferenceData, StaticReferenceData};
use crate::status::EndpointStatusCache;
use crate::transport::{HttpTransport, Transport};

/// What a logical request resolved to.
///
/// Expansion into exactly one concrete request yields `Single`; anything
/// else yields `Many` in expansion order.
#[derive(Debug)]
pub enum Outcome {
    /// The logical request produced exactly one exchange.
    Single(ApiResponse),
    /// The logical request produced several exchanges.
    Many(Vec<ApiResponse>),
}

impl Outcome {
    /// The single response, when there was exactly one.
    pub fn single(self) -> Option<ApiResponse> {
        match self {
            Outcome::Single(response) => Some(response),
            Outcome::Many(_) => None,
        }
    }

    /// All responses, regardless of arity.
    pub fn into_vec(self) -> Vec<ApiResponse> {
        match self {
            Outcome::Single(response) => vec![response],
            Outcome::Many(responses) => responses,
        }
    }
}

/// A client session over one remote API.
///
/// Composes the expansion seam, the validation pipeline, both caches and
/// the dispatch engine. Every collaborator is an explicitly constructed,
/// injectable component — there is no process-global state, so isolated
/// instances coexist freely (and tests rely on that).
///
/// ```no_run
/// use farcast::{ClientConfig, Session};
/// use farcast_core::ApiRequest;
/// use http::Method;
///
/// # async fn run() -> farcast::Result<()> {
/// let session = Session::builder(ClientConfig::new(
///     "https://api.example.net/latest",
///     "https://api.example.net/status.json",
/// ))
/// .build();
///
/// let request = ApiRequest::new(Method::GET, "/markets/{region_id}/orders/")
///     .param("region_id", 10000002);
/// let outcome = session.request(request).await?;
/// # Ok(())
/// # }
/// ```
pub struct Session {
    expander: Arc<dyn Expand>,
    etag: Arc<EtagCache>,
    dispatcher: Dispatcher,
}

impl Session {
    /// Starts building a session from a configuration.
    pub fn builder(config: ClientConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    /// Sends a logical request and returns its materialized outcome.
    ///
    /// Equivalent to [`prepare`](Self::prepare) followed by
    /// [`issue`](Self::issue), collapsing a one-element result into
    /// [`Outcome::Single`].
    pub async fn request(&self, request: ApiRequest) -> Result<Outcome> {
        let prepared = self.prepare(&request).await?;
        let mut responses = self.issue(prepared).await?;
        if responses.len() == 1
            && let Some(only) = responses.pop()
        {
            return Ok(Outcome::Single(only));
        }
        Ok(Outcome::Many(responses))
    }

    /// Convenience GET without extra parameters.
    pub async fn get(&self, endpoint: &str) -> Result<Outcome> {
        self.request(ApiRequest::new(Method::GET, endpoint)).await
    }

    /// Convenience HEAD without extra parameters.
    pub async fn head(&self, endpoint: &str) -> Result<Outcome> {
        self.request(ApiRequest::new(Method::HEAD, endpoint)).await
    }

    /// Expands a logical request and injects conditional-request headers.
    ///
    /// Each concrete request that does not already carry `If-None-Match`
    /// gets one from the conditional cache; an empty value is the legal
    /// "no prior version" signal.
    pub async fn prepare(&self, request: &ApiRequest) -> Result<Vec<PreparedRequest>> {
        let mut prepared = self.expander.expand(request)?;
        if prepared.is_empty() {
            return Err(Error::Expansion(
                "expansion produced no concrete requests".into(),
            ));
        }

        for concrete in &mut prepared {
            if concrete.headers().contains_key(IF_NONE_MATCH) {
                continue;
            }
            let etag = self
                .etag
                .lookup(concrete.url())
                .await?
                .map(|entry| entry.etag)
                .unwrap_or_default();
            match HeaderValue::from_str(&etag) {
                Ok(value) => {
                    concrete.headers_mut().insert(IF_NONE_MATCH, value);
                }
                Err(_) => {
                    // A stored etag that is not a legal header value is
                    // useless; fall back to the no-prior-version signal.
                    concrete
                        .headers_mut()
                        .insert(IF_NONE_MATCH, HeaderValue::from_static(""));
                }
            }
        }

        debug!(
            endpoint = request.endpoint(),
            count = prepared.len(),
            "request expanded"
        );
        Ok(prepared)
    }

    /// Issues prepared requests concurrently; results come back in input
    /// order.
    pub async fn issue(&self, requests: Vec<PreparedRequest>) -> Result<Vec<ApiResponse>> {
        self.dispatcher.issue(requests).await
    }
}

/// Builder wiring a [`Session`]'s collaborators.
///
/// Everything has a working default: in-memory backend, reqwest
/// transport, template expander, empty catalog and reference data, a
/// never-ready fallback hook, and a check pipeline holding only the
/// endpoint-health rule.
pub struct SessionBuilder {
    config: ClientConfig,
    backend: Option<Arc<dyn Backend>>,
    transport: Option<Arc<dyn Transport>>,
    reference: Option<Arc<dyn ReferenceData>>,
    catalog: Option<Arc<dyn EndpointCatalog>>,
    fallback: Option<Arc<dyn Substitute>>,
    expander: Option<Arc<dyn Expand>>,
    entity_checks: Vec<(SmolStr, String)>,
    extra_checks: Vec<Box<dyn ParamCheck>>,
}

impl SessionBuilder {
    fn new(config: ClientConfig) -> Self {
        SessionBuilder {
            config,
            backend: None,
            transport: None,
            reference: None,
            catalog: None,
            fallback: None,
            expander: None,
            entity_checks: Vec::new(),
            extra_checks: Vec::new(),
        }
    }

    /// Storage for memoized verdicts and conditional-cache entries.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Replaces the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Static reference dataset for entity-identifier checks.
    pub fn reference(mut self, reference: Arc<dyn ReferenceData>) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Endpoint parameter metadata.
    pub fn catalog(mut self, catalog: Arc<dyn EndpointCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Fallback response hook consulted for blocked requests.
    pub fn fallback(mut self, fallback: Arc<dyn Substitute>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Replaces the expansion collaborator.
    pub fn expander(mut self, expander: Arc<dyn Expand>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Adds an entity-identifier check for `param`, confirming accepted
    /// values against `confirm_url` (an `{id}` template).
    pub fn entity_check(mut self, param: impl Into<SmolStr>, confirm_url: impl Into<String>) -> Self {
        self.entity_checks.push((param.into(), confirm_url.into()));
        self
    }

    /// Appends a custom check after the built-in ones, in call order.
    pub fn check(mut self, check: Box<dyn ParamCheck>) -> Self {
        self.extra_checks.push(check);
        self
    }

    /// Builds the session.
    pub fn build(self) -> Session {
        let config = self.config;

        let transport: Arc<dyn Transport> = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new(config.user_agent.clone())));
        let backend: Arc<dyn Backend> = self
            .backend
            .unwrap_or_else(|| Arc::new(MemoryBackend::new()));
        let catalog: Arc<dyn EndpointCatalog> = self
            .catalog
            .unwrap_or_else(|| Arc::new(StaticCatalog::new()));
        let reference: Arc<dyn ReferenceData> = self
            .reference
            .unwrap_or_else(|| Arc::new(StaticReferenceData::default()));

        let status = Arc::new(EndpointStatusCache::new(
            transport.clone(),
            config.status_url.clone(),
            config.status_path.clone(),
            config.status_refresh_interval,
        ));

        let mut checks: Vec<Box<dyn ParamCheck>> =
            vec![Box::new(EndpointHealthCheck::new(status))];
        for (param, confirm_url) in self.entity_checks {
            checks.push(Box::new(EntityIdCheck::new(
                param,
                reference.clone(),
                catalog.clone(),
                backend.clone(),
                transport.clone(),
                confirm_url,
                config.check_ttl,
            )));
        }
        checks.extend(self.extra_checks);

        let checker = Arc::new(RequestChecker::new(
            checks,
            config.checks_enabled,
            config.strict,
            config.lenient_verdict,
        ));
        let etag = Arc::new(EtagCache::new(backend));
        let fallback: Arc<dyn Substitute> =
            self.fallback.unwrap_or_else(|| Arc::new(NeverSubstitute));
        let expander: Arc<dyn Expand> = self
            .expander
            .unwrap_or_else(|| Arc::new(TemplateExpander::new(config.base_url.clone())));

        let dispatcher = Dispatcher::new(
            checker,
            etag.clone(),
            fallback,
            transport,
            config.response_ttl,
        );

        Session {
            expander,
            etag,
            dispatcher,
        }
    }
}
