//! Concurrent fan-out of prepared requests, in-order fan-in of responses.

use std::sync::Arc;
use std::time::Duration;

use farcast_core::{ApiResponse, PreparedRequest};
use futures::future::join_all;
use http::StatusCode;
use tracing::debug;

use crate::check::RequestChecker;
use crate::error::{Error, Result};
use crate::etag::{EtagCache, MISSING_ETAG};
use crate::fallback::Substitute;
use crate::transport::{RawReply, Transport};

/// Drives each prepared request through validation, conditional send and
/// cache write-back.
pub struct Dispatcher {
    checker: Arc<RequestChecker>,
    etag: Arc<EtagCache>,
    fallback: Arc<dyn Substitute>,
    transport: Arc<dyn Transport>,
    response_ttl: Duration,
}

impl Dispatcher {
    /// Assembles a dispatcher from its shared collaborators.
    pub fn new(
        checker: Arc<RequestChecker>,
        etag: Arc<EtagCache>,
        fallback: Arc<dyn Substitute>,
        transport: Arc<dyn Transport>,
        response_ttl: Duration,
    ) -> Self {
        Dispatcher {
            checker,
            etag,
            fallback,
            transport,
            response_ttl,
        }
    }

    /// Issues every request concurrently and returns one response per
    /// request, in input order.
    ///
    /// Completion order is unconstrained; only the returned vector is
    /// ordered. Every element must have gone through expansion — a single
    /// unprepared request fails the whole call with [`Error::Misuse`]
    /// before anything is dispatched.
    ///
    /// Fan-out is unbounded: each request becomes one task against the
    /// shared pool. Very large expansions will open as many concurrent
    /// exchanges as the transport allows.
    pub async fn issue(&self, requests: Vec<PreparedRequest>) -> Result<Vec<ApiResponse>> {
        if let Some(stray) = requests.iter().find(|request| !request.is_prepared()) {
            return Err(Error::Misuse(format!(
                "cannot issue an unprepared request to {}; expand it first",
                stray.url()
            )));
        }

        let tasks = requests.into_iter().map(|request| self.issue_one(request));
        join_all(tasks).await.into_iter().collect()
    }

    /// Runs one request through the full lifecycle.
    async fn issue_one(&self, request: PreparedRequest) -> Result<ApiResponse> {
        let valid = self.checker.evaluate(&request).await?;

        if !valid && self.fallback.ready(&request) {
            // Blocked and substitutable: the request never reaches the
            // network and the conditional cache is untouched.
            debug!(url = request.url(), "synthesizing response for blocked request");
            return Ok(self.fallback.synthesize(&request));
        }

        let reply = self
            .transport
            .send(request.method(), request.url(), request.headers())
            .await?;

        if reply.status == StatusCode::NOT_MODIFIED {
            return match self.etag.lookup(request.url()).await? {
                Some(entry) => {
                    debug!(url = request.url(), "not modified, serving cached response");
                    Ok(ApiResponse::from_cached(entry.response))
                }
                None => Err(Error::UnresolvedConditionalCacheMiss {
                    url: request.url().to_owned(),
                }),
            };
        }

        let response = materialize(request, reply);
        if response.ok() {
            let etag = response.etag().unwrap_or(MISSING_ETAG);
            let ttl = response.freshness_lifetime().unwrap_or(self.response_ttl);
            self.etag.store(response.url(), etag, &response, ttl).await?;
        }
        Ok(response)
    }
}

fn materialize(request: PreparedRequest, reply: RawReply) -> ApiResponse {
    ApiResponse::new(
        reply.status,
        reply.headers,
        reply.reason,
        reply.url,
        reply.text,
        Some(Arc::new(request)),
    )
}
