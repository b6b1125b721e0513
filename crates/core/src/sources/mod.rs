//! History sources.
//!
//! This module contains:
//! - The [`HistorySource`] trait every upstream implements
//! - [`WikipediaSource`]: the primary localized rendered-page source
//! - [`JsonApiSource`]: the generic JSON API, called directly or through a relay
//!
//! Sources never retry and never consult the cache; ordering and fallback
//! belong to [`HistoryFetcher`](crate::fetcher::HistoryFetcher).

mod http;
mod json_api;
mod wikipedia;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::SourceError;
use crate::models::DayHistory;

pub use http::build_client;
pub use json_api::{JsonApiSource, SECONDARY_SOURCE_ID};
pub use wikipedia::{WikipediaSource, PRIMARY_SOURCE_ID};

/// An upstream that can produce a [`DayHistory`] for a date.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Identifier used in logs, e.g. `KO_WIKIPEDIA`.
    fn id(&self) -> &str;

    /// Fetch and parse the day. Any failure, including a body of the wrong
    /// shape, is reported as a [`SourceError`].
    async fn fetch(&self, date: NaiveDate) -> Result<DayHistory, SourceError>;
}
