//! Configuration for sources and the day cache.

use std::time::Duration;

pub const DEFAULT_WIKI_BASE_URL: &str = "https://ko.wikipedia.org";
pub const DEFAULT_SECONDARY_URL: &str = "https://history.muffinlabs.com/date";
pub const DEFAULT_RELAY_TEMPLATES: [&str; 2] =
    ["https://api.allorigins.win/raw?url=", "https://corsproxy.io/?"];

const DEFAULT_USER_AGENT: &str = concat!("oneul/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upstream endpoints and HTTP settings.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Root of the localized encyclopedia, without trailing slash.
    pub wiki_base_url: String,
    /// Generic on-this-day JSON API. `/{month}/{day}` is appended.
    pub secondary_url: String,
    /// Relay prefixes; the percent-encoded secondary URL is appended.
    pub relay_templates: Vec<String>,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            wiki_base_url: DEFAULT_WIKI_BASE_URL.to_string(),
            secondary_url: DEFAULT_SECONDARY_URL.to_string(),
            relay_templates: DEFAULT_RELAY_TEMPLATES.iter().map(|t| t.to_string()).collect(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Day-cache settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Prefix of every day record key; the `YYYY-MM-DD` date follows.
    pub key_prefix: String,
    /// Records older than this are not served as today's data.
    pub freshness: Duration,
    /// How many previous days are scanned when everything else failed.
    /// Records older than this are evicted.
    pub lookback_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: "history_data_".to_string(),
            freshness: Duration::from_secs(24 * 60 * 60),
            lookback_days: 7,
        }
    }
}
