//! Error types for history acquisition.
//!
//! This module provides:
//! - [`SourceError`]: failure of a single upstream source. Never surfaced to
//!   callers of the fetcher; every variant means "try the next source".
//! - [`RetryClass`]: how a caller that does retry (the translator) should react.
//! - [`HistoryError`]: errors that do reach callers.
//! - [`PublishError`]: transport failures of the social-post publisher.

use thiserror::Error;

/// User-facing message returned when every source and every cached day failed.
pub const EXHAUSTED_MESSAGE: &str =
    "데이터를 가져올 수 없습니다. 인터넷 연결을 확인하고 페이지를 새로고침하세요.";

/// Retry classification of an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Retrying the same upstream will not help.
    Never,
    /// Transient; the same upstream may be retried after a delay.
    WithBackoff,
    /// The upstream asked us to back off. Stop calling it for a while.
    Cooldown,
}

/// Errors produced by a single upstream.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request could not be sent or the connection failed.
    #[error("Network error: {provider} - {message}")]
    Network { provider: String, message: String },

    /// The request timed out.
    #[error("Timeout: {provider}")]
    Timeout { provider: String },

    /// The source rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited { provider: String },

    /// The source answered with a non-success HTTP status.
    #[error("HTTP {status} from {provider}")]
    Http { provider: String, status: u16 },

    /// The body could not be parsed into the expected shape.
    #[error("Malformed response from {provider}: {message}")]
    Malformed { provider: String, message: String },

    /// The body parsed but held no entries.
    #[error("No entries from {provider}")]
    Empty { provider: String },
}

impl SourceError {
    /// Identifier of the source that failed.
    pub fn provider(&self) -> &str {
        match self {
            Self::Network { provider, .. }
            | Self::Timeout { provider }
            | Self::RateLimited { provider }
            | Self::Http { provider, .. }
            | Self::Malformed { provider, .. }
            | Self::Empty { provider } => provider,
        }
    }

    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. } => RetryClass::Cooldown,
            Self::Network { .. } | Self::Timeout { .. } => RetryClass::WithBackoff,
            Self::Http { status, .. } if *status >= 500 => RetryClass::WithBackoff,
            Self::Http { .. } | Self::Malformed { .. } | Self::Empty { .. } => RetryClass::Never,
        }
    }

    /// Map a transport error from `reqwest` into a source error.
    pub fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else if err.is_decode() {
            Self::Malformed {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Network {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Errors surfaced to callers of the history service.
///
/// `Clone` so that callers joined onto one in-flight fetch can all receive
/// the same result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// No live source answered and no cached day within the lookback window exists.
    #[error("{}", EXHAUSTED_MESSAGE)]
    Exhausted,

    /// The key-value store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A record could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::Serialization(err.to_string())
    }
}

/// Errors from the social-post publisher transport.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Publish request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Publish endpoint returned HTTP {status}")]
    Rejected {
        status: u16,
        body: Option<serde_json::Value>,
    },
}
