use farcast_backend::BackendError;
use serde_json::Value;
use smol_str::SmolStr;
use thiserror::Error;

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the request lifecycle.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested route is reported unhealthy by the status document.
    #[error("endpoint is down: {route}")]
    EndpointDown {
        /// The unhealthy route.
        route: SmolStr,
    },

    /// A request parameter was judged invalid before any network call.
    #[error("invalid parameter {name}={value}")]
    InvalidParameter {
        /// Parameter name.
        name: SmolStr,
        /// The rejected value.
        value: Value,
    },

    /// The server answered 304 Not Modified but no conditional-cache entry
    /// exists for the URL.
    ///
    /// This indicates cache/store inconsistency rather than a validation
    /// judgment; there is no defined recovery, so it is always fatal and
    /// never downgraded by non-strict mode.
    #[error("304 Not Modified for {url} without a conditional cache entry")]
    UnresolvedConditionalCacheMiss {
        /// The URL the conditional request was sent to.
        url: String,
    },

    /// Caller misuse, such as dispatching a request that never went
    /// through expansion.
    #[error("misuse: {0}")]
    Misuse(String),

    /// Expansion produced no concrete requests or could not resolve the
    /// endpoint template.
    #[error("expansion failed: {0}")]
    Expansion(String),

    /// Transport-level failure from the underlying HTTP client.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Storage failure in a cache backend.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// I/O failure loading a bulk dataset or catalog document.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A bulk dataset or catalog document did not parse.
    #[error("malformed document: {0}")]
    Format(#[from] serde_json::Error),
}
