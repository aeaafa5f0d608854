//! Entity-identifier validation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use farcast_backend::{Backend, CacheBackend};
use farcast_core::PreparedRequest;
use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;
use smol_str::SmolStr;
use tracing::debug;

use crate::catalog::EndpointCatalog;
use crate::check::{ParamCheck, Verdict};
use crate::error::{Error, Result};
use crate::reference::ReferenceData;
use crate::transport::Transport;

/// Attempts for the confirming lookup before the static verdict stands.
const CONFIRM_ATTEMPTS: u32 = 3;

/// Validates an entity-identifier parameter in two stages.
///
/// Stage one consults the static reference dataset: an identifier it does
/// not list, or lists as unpublished, is invalid and no network call is
/// made. Stage two confirms accepted identifiers against the live API,
/// because the static snapshot must not block identifiers added after it
/// was taken. The confirming lookup retries only on 502, up to three
/// attempts; any other status is final and its `published` field is the
/// verdict. Exhausting the retries leaves the static verdict in force.
///
/// Verdicts are memoized per (check, parameter, identifier) with a long
/// TTL; once written, a verdict is reused until expiry regardless of
/// remote changes.
pub struct EntityIdCheck {
    param: SmolStr,
    reference: Arc<dyn ReferenceData>,
    catalog: Arc<dyn EndpointCatalog>,
    backend: Arc<dyn Backend>,
    transport: Arc<dyn Transport>,
    confirm_url: String,
    memo_ttl: Duration,
}

impl EntityIdCheck {
    /// Creates a check for the named parameter.
    ///
    /// `confirm_url` is a template with an `{id}` placeholder resolved
    /// per lookup.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        param: impl Into<SmolStr>,
        reference: Arc<dyn ReferenceData>,
        catalog: Arc<dyn EndpointCatalog>,
        backend: Arc<dyn Backend>,
        transport: Arc<dyn Transport>,
        confirm_url: impl Into<String>,
        memo_ttl: Duration,
    ) -> Self {
        EntityIdCheck {
            param: param.into(),
            reference,
            catalog,
            backend,
            transport,
            confirm_url: confirm_url.into(),
            memo_ttl,
        }
    }

    async fn verdict_for(&self, id: u64) -> Result<bool> {
        let key = format!("check:{}:{}={}", self.name(), self.param, id);
        if let Some(cached) = self.backend.get::<bool>(&key).await? {
            debug!(param = %self.param, id, "memoized check verdict");
            return Ok(cached.into_inner());
        }

        let verdict = self.confirm(id).await?;
        self.backend.set(&key, &verdict, Some(self.memo_ttl)).await?;
        Ok(verdict)
    }

    async fn confirm(&self, id: u64) -> Result<bool> {
        if !self.reference.contains(id) {
            return Ok(false);
        }
        if !self.reference.published(id).unwrap_or(false) {
            return Ok(false);
        }

        let url = self.confirm_url.replace("{id}", &id.to_string());
        let mut attempts = CONFIRM_ATTEMPTS;
        while attempts > 0 {
            let reply = self
                .transport
                .send(&Method::GET, &url, &HeaderMap::new())
                .await?;
            if reply.status == StatusCode::BAD_GATEWAY {
                attempts -= 1;
                continue;
            }
            let body: Value = serde_json::from_str(&reply.text).unwrap_or(Value::Null);
            return Ok(body
                .get("published")
                .and_then(Value::as_bool)
                .unwrap_or(false));
        }
        // Every attempt hit a 502: the static acceptance stands rather
        // than producing a false negative.
        Ok(true)
    }
}

#[async_trait]
impl ParamCheck for EntityIdCheck {
    fn name(&self) -> &str {
        "entity_id"
    }

    async fn check(&self, request: &PreparedRequest) -> Result<Verdict> {
        // Endpoints that do not declare the parameter are not checked.
        let Some(spec) = self
            .catalog
            .parameters(request.route())
            .and_then(|table| table.get(&self.param))
        else {
            return Ok(Verdict::Pass);
        };

        let argument = request.argument(&self.param);
        let id = match argument {
            None if !spec.required => return Ok(Verdict::Pass),
            None => {
                return Ok(Verdict::Block(Error::InvalidParameter {
                    name: self.param.clone(),
                    value: Value::Null,
                }));
            }
            Some(value) => match value.as_u64() {
                Some(id) => id,
                None => {
                    return Ok(Verdict::Block(Error::InvalidParameter {
                        name: self.param.clone(),
                        value: value.clone(),
                    }));
                }
            },
        };

        if self.verdict_for(id).await? {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Block(Error::InvalidParameter {
                name: self.param.clone(),
                value: Value::from(id),
            }))
        }
    }
}
