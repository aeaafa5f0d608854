//! Periodically refreshed endpoint-health cache.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use http::{HeaderMap, Method};
use serde::Deserialize;
use smol_str::SmolStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::transport::Transport;

/// Status value the remote document uses for a healthy route.
const HEALTHY_SENTINEL: &str = "green";

/// One entry of the remote status document.
#[derive(Debug, Deserialize)]
struct RouteStatus {
    route: String,
    status: String,
}

#[derive(Debug, Default)]
struct StatusState {
    routes: HashMap<SmolStr, bool>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl StatusState {
    fn needs_refresh(&self, interval: Duration) -> bool {
        if self.routes.is_empty() {
            return true;
        }
        match self.refreshed_at {
            Some(at) => {
                let age = Utc::now().signed_duration_since(at);
                age >= chrono::Duration::from_std(interval).unwrap_or(chrono::Duration::MAX)
            }
            None => true,
        }
    }
}

/// Route-level health, refreshed wholesale from a remote status document.
///
/// The in-process map is replaced atomically on each refresh and persisted
/// to a local file so a restarted process serves the last-known map until
/// the next refresh is due. A failed refresh keeps the previous map in
/// place: readers observe stale-but-valid data, never an error.
///
/// Routes absent from the document are reported unhealthy.
pub struct EndpointStatusCache {
    transport: Arc<dyn Transport>,
    status_url: String,
    path: PathBuf,
    refresh_interval: Duration,
    state: RwLock<StatusState>,
}

impl EndpointStatusCache {
    /// Creates the cache, loading the persisted map if one exists.
    ///
    /// A missing or unreadable file starts the cache empty, which forces
    /// a remote refresh on first use. The persisted file's modification
    /// time counts as the last refresh instant.
    pub fn new(
        transport: Arc<dyn Transport>,
        status_url: impl Into<String>,
        path: impl Into<PathBuf>,
        refresh_interval: Duration,
    ) -> Self {
        let path = path.into();
        let state = load_persisted(&path).unwrap_or_default();
        EndpointStatusCache {
            transport,
            status_url: status_url.into(),
            path,
            refresh_interval,
            state: RwLock::new(state),
        }
    }

    /// Whether `route` is currently reported healthy.
    ///
    /// Refreshes the map first when it is empty or older than the refresh
    /// interval; within one interval, reads are served from the in-process
    /// copy without any remote call.
    pub async fn is_healthy(&self, route: &str) -> bool {
        if self.state.read().await.needs_refresh(self.refresh_interval) {
            self.refresh().await;
        }
        let state = self.state.read().await;
        state.routes.get(route).copied().unwrap_or(false)
    }

    /// Fetches and installs a fresh status map.
    ///
    /// All-or-nothing: fetch or parse failure leaves the previous map
    /// untouched and is reported at warn level only.
    async fn refresh(&self) {
        let mut state = self.state.write().await;
        // A concurrent caller may have refreshed while this task waited
        // for the write lock.
        if !state.needs_refresh(self.refresh_interval) {
            return;
        }

        let routes = match self.fetch_routes().await {
            Ok(routes) => routes,
            Err(error) => {
                warn!(%error, url = %self.status_url, "status refresh failed, serving previous map");
                return;
            }
        };

        debug!(routes = routes.len(), "endpoint status map refreshed");
        state.routes = routes;
        state.refreshed_at = Some(Utc::now());

        if let Err(error) = persist(&self.path, &state.routes) {
            warn!(%error, path = %self.path.display(), "failed to persist status map");
        }
    }

    async fn fetch_routes(&self) -> crate::Result<HashMap<SmolStr, bool>> {
        let reply = self
            .transport
            .send(&Method::GET, &self.status_url, &HeaderMap::new())
            .await?;
        let entries: Vec<RouteStatus> = serde_json::from_str(&reply.text)?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                (
                    SmolStr::new(entry.route),
                    entry.status == HEALTHY_SENTINEL,
                )
            })
            .collect())
    }
}

fn load_persisted(path: &Path) -> Option<StatusState> {
    let raw = fs::read_to_string(path).ok()?;
    let routes: HashMap<SmolStr, bool> = serde_json::from_str(&raw).ok()?;
    if routes.is_empty() {
        return None;
    }
    let refreshed_at = fs::metadata(path)
        .ok()
        .and_then(|meta| meta.modified().ok())
        .map(DateTime::<Utc>::from);
    Some(StatusState {
        routes,
        refreshed_at,
    })
}

fn persist(path: &Path, routes: &HashMap<SmolStr, bool>) -> std::io::Result<()> {
    let serialized = serde_json::to_string(routes)?;
    fs::write(path, serialized)
}
