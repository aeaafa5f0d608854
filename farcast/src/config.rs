//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`Session`](crate::Session).
///
/// Deserializable from any serde format; durations accept humantime
/// strings (`"60s"`, `"30days"`, `"24h"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Base URL concrete request URLs are resolved against.
    pub base_url: String,

    /// URL of the remote endpoint-status document.
    pub status_url: String,

    /// Local file the parsed status map is persisted to across restarts.
    #[serde(default = "default_status_path")]
    pub status_path: PathBuf,

    /// Master switch for pre-flight validation. Disabled means every
    /// request is reported valid.
    #[serde(default = "default_true")]
    pub checks_enabled: bool,

    /// When true, blocked requests surface their specific error instead
    /// of a boolean verdict.
    #[serde(default)]
    pub strict: bool,

    /// Verdict reported for a blocked request in non-strict mode.
    ///
    /// The request is still logged as blocked either way; a `true` here
    /// lets it proceed to the network.
    #[serde(default)]
    pub lenient_verdict: bool,

    /// How long the endpoint-status map stays fresh between remote
    /// refreshes.
    #[serde(default = "default_status_refresh", with = "humantime_serde")]
    pub status_refresh_interval: Duration,

    /// Memoization lifetime for per-parameter check verdicts.
    #[serde(default = "default_check_ttl", with = "humantime_serde")]
    pub check_ttl: Duration,

    /// Conditional-cache lifetime for responses that carry no usable
    /// expiry signal of their own.
    #[serde(default = "default_response_ttl", with = "humantime_serde")]
    pub response_ttl: Duration,

    /// User agent announced by the shared connection pool.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration with the given base and status URLs and
    /// default policies.
    pub fn new(base_url: impl Into<String>, status_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            status_url: status_url.into(),
            status_path: default_status_path(),
            checks_enabled: default_true(),
            strict: false,
            lenient_verdict: false,
            status_refresh_interval: default_status_refresh(),
            check_ttl: default_check_ttl(),
            response_ttl: default_response_ttl(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_status_path() -> PathBuf {
    PathBuf::from("status.json")
}

fn default_true() -> bool {
    true
}

fn default_status_refresh() -> Duration {
    Duration::from_secs(60)
}

fn default_check_ttl() -> Duration {
    // Check verdicts are stable at API scope over this horizon.
    Duration::from_secs(24 * 3600 * 30)
}

fn default_response_ttl() -> Duration {
    Duration::from_secs(24 * 3600)
}

fn default_user_agent() -> String {
    concat!("farcast/", env!("CARGO_PKG_VERSION")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_minimal_document() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "base_url": "https://api.example.net/latest",
                "status_url": "https://api.example.net/status.json"
            }"#,
        )
        .unwrap();
        assert!(config.checks_enabled);
        assert!(!config.strict);
        assert_eq!(config.status_refresh_interval, Duration::from_secs(60));
        assert_eq!(config.check_ttl, Duration::from_secs(24 * 3600 * 30));
        assert_eq!(config.response_ttl, Duration::from_secs(24 * 3600));
    }

    #[test]
    fn humantime_durations() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "base_url": "https://api.example.net/latest",
                "status_url": "https://api.example.net/status.json",
                "status_refresh_interval": "2m",
                "check_ttl": "30days",
                "response_ttl": "1h"
            }"#,
        )
        .unwrap();
        assert_eq!(config.status_refresh_interval, Duration::from_secs(120));
        assert_eq!(config.check_ttl, Duration::from_secs(30 * 24 * 3600));
        assert_eq!(config.response_ttl, Duration::from_secs(3600));
    }
}
