#![warn(missing_docs)]
//! # farcast
//!
//! Concurrent, cache-aware client for rate-sensitive HTTP APIs.
//!
//! One logical request becomes zero or more concrete exchanges: requests
//! predicted to fail are blocked before they reach the wire, conditional
//! requests recover unchanged bodies from an entity-tag cache, and
//! everything that does go out is dispatched concurrently with results
//! reassembled in input order.
//!
//! The only public entry point is [`Session`]; everything else is a
//! collaborator you can inspect, replace or inject through
//! [`SessionBuilder`].

/// Endpoint parameter metadata: which parameters an endpoint declares and
/// whether they are required.
pub mod catalog;

/// Pre-flight validation pipeline.
///
/// A closed [`RequestChecker`](check::RequestChecker) orchestrates an
/// ordered list of pluggable [`ParamCheck`](check::ParamCheck)s with
/// short-circuit-on-first-failure semantics.
pub mod check;

/// Client configuration with serde/humantime deserialization.
pub mod config;

/// Concurrent fan-out/fan-in dispatch of prepared requests.
pub mod dispatch;

/// Error types for the request lifecycle.
pub mod error;

/// Entity-tag keyed conditional response cache.
pub mod etag;

/// Expansion seam turning logical requests into concrete ones.
pub mod expand;

/// Fallback hook synthesizing responses for blocked requests.
pub mod fallback;

/// Static reference data consulted by entity-identifier checks.
pub mod reference;

/// The orchestrating session and its builder.
pub mod session;

/// Periodically refreshed endpoint-health cache.
pub mod status;

/// Transport seam over the shared connection pool.
pub mod transport;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use session::{Outcome, Session, SessionBuilder};

pub use farcast_core::{ApiRequest, ApiResponse, CachedResponse, PreparedRequest};

/// The `farcast` prelude.
///
/// ```rust
/// use farcast::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ClientConfig;
    pub use crate::error::{Error, Result};
    pub use crate::session::{Outcome, Session};
    pub use farcast_core::{ApiRequest, ApiResponse, PreparedRequest};
}
