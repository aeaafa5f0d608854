//! Fallback response hook for blocked requests.

use farcast_core::{ApiResponse, PreparedRequest};
use http::{HeaderMap, StatusCode};

/// Strategy producing a synthetic response for a request that validation
/// blocked.
///
/// Consulted only after a request is judged invalid. A hook that is not
/// [`ready`](Substitute::ready) leaves the invalid request to proceed to
/// the network anyway — that permissiveness is part of the contract, not
/// an oversight. A ready hook's synthesized response is returned without
/// any network call and without touching the conditional cache.
pub trait Substitute: Send + Sync {
    /// Whether this hook can stand in for the given blocked request.
    fn ready(&self, request: &PreparedRequest) -> bool;

    /// Produces the synthetic response.
    ///
    /// Only called after [`ready`](Substitute::ready) returned true.
    fn synthesize(&self, request: &PreparedRequest) -> ApiResponse;
}

/// Hook that never substitutes; every blocked request goes to the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverSubstitute;

impl Substitute for NeverSubstitute {
    fn ready(&self, _request: &PreparedRequest) -> bool {
        false
    }

    fn synthesize(&self, request: &PreparedRequest) -> ApiResponse {
        ApiResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            None,
            request.url(),
            "",
            None,
        )
    }
}
