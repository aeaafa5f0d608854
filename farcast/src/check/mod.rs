//! Pre-flight request validation.
//!
//! A [`RequestChecker`] runs an ordered sequence of [`ParamCheck`]s over a
//! prepared request and predicts whether the remote API would reject it.
//! The goal is to eliminate avoidable 4xx exchanges in steady state; no
//! check ever feeds back from actual responses.
//!
//! The orchestration is deliberately closed: [`RequestChecker::evaluate`]
//! and the sequence runner cannot be replaced or specialized. Only the
//! list of checks is configurable, at construction time.

mod entity;

pub use entity::EntityIdCheck;

use std::sync::Arc;

use async_trait::async_trait;
use farcast_core::PreparedRequest;
use smol_str::SmolStr;
use tracing::warn;

use crate::error::{Error, Result};
use crate::status::EndpointStatusCache;

/// Outcome of a single check.
#[derive(Debug)]
pub enum Verdict {
    /// The check has no objection.
    Pass,
    /// The request would fail remotely, for the contained reason.
    Block(Error),
}

/// One pluggable validation rule.
///
/// Checks inspect the request only; a check that needs remote state (a
/// confirming lookup, a status document) owns that collaboration itself.
/// Errors returned here are infrastructure failures, not verdicts —
/// a predicted rejection is [`Verdict::Block`].
#[async_trait]
pub trait ParamCheck: Send + Sync {
    /// Stable identity of this check, used in memoization keys and logs.
    fn name(&self) -> &str;

    /// Judges the request.
    async fn check(&self, request: &PreparedRequest) -> Result<Verdict>;
}

/// Ordered, short-circuiting validation pipeline.
///
/// Checks run in construction order and stop at the first [`Verdict::Block`].
/// A blocked request is logged at warn level with its endpoint and
/// arguments; in strict mode the specific error is returned, otherwise the
/// configured lenient verdict stands in.
pub struct RequestChecker {
    enabled: bool,
    strict: bool,
    lenient_verdict: bool,
    checks: Vec<Box<dyn ParamCheck>>,
}

impl RequestChecker {
    /// Creates a checker over the given ordered check list.
    pub fn new(
        checks: Vec<Box<dyn ParamCheck>>,
        enabled: bool,
        strict: bool,
        lenient_verdict: bool,
    ) -> Self {
        RequestChecker {
            enabled,
            strict,
            lenient_verdict,
            checks,
        }
    }

    /// Judges a prepared request.
    ///
    /// Returns the validity verdict, or the blocking error when strict
    /// mode is on. A disabled checker reports every request valid.
    pub async fn evaluate(&self, request: &PreparedRequest) -> Result<bool> {
        if !self.enabled {
            return Ok(true);
        }

        match self.run_checks(request).await? {
            Verdict::Pass => Ok(true),
            Verdict::Block(error) => {
                let arguments: Vec<String> = request
                    .arguments()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                warn!(
                    route = request.route(),
                    arguments = ?arguments,
                    %error,
                    "request blocked by pre-flight checks"
                );
                if self.strict {
                    Err(error)
                } else {
                    Ok(self.lenient_verdict)
                }
            }
        }
    }

    /// Runs the check sequence, stopping at the first block.
    async fn run_checks(&self, request: &PreparedRequest) -> Result<Verdict> {
        for check in &self.checks {
            if let Verdict::Block(error) = check.check(request).await? {
                return Ok(Verdict::Block(error));
            }
        }
        Ok(Verdict::Pass)
    }
}

/// Route-health check; always the first rule in the default pipeline.
pub struct EndpointHealthCheck {
    status: Arc<EndpointStatusCache>,
}

impl EndpointHealthCheck {
    /// Creates the check over a shared status cache.
    pub fn new(status: Arc<EndpointStatusCache>) -> Self {
        EndpointHealthCheck { status }
    }
}

#[async_trait]
impl ParamCheck for EndpointHealthCheck {
    fn name(&self) -> &str {
        "endpoint_health"
    }

    async fn check(&self, request: &PreparedRequest) -> Result<Verdict> {
        if self.status.is_healthy(request.route()).await {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Block(Error::EndpointDown {
                route: SmolStr::new(request.route()),
            }))
        }
    }
}
