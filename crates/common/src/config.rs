//! Service configuration types.

use serde::{Deserialize, Serialize};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Geocoding provider base URL.
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// Weather provider base URL.
    #[serde(default = "default_nws_url")]
    pub nws_url: String,

    /// Cache entry lifetime in seconds, used by both namespaces.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Outbound request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent to both providers. NWS rejects requests
    /// without one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_geocode_url() -> String {
    "https://geocode.maps.co".into()
}

fn default_nws_url() -> String {
    "https://api.weather.gov".into()
}

fn default_cache_ttl_secs() -> u64 {
    1800
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "zipcast/0.1 (forecast lookup; contact@example.com)".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            geocode_url: default_geocode_url(),
            nws_url: default_nws_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}
