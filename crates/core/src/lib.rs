//! Oneul Core - "on this day in history" acquisition.
//!
//! This crate extracts events and births from the localized encyclopedia's
//! rendered markup, orders them so Korea-related entries come first, and
//! fetches a day through an ordered list of sources and cache tiers.
//! Persistence goes through the [`storage::KeyValueStore`] trait, which the
//! `storage-sqlite` crate implements.

pub mod cache;
pub mod config;
pub mod dates;
pub mod errors;
pub mod extract;
pub mod fetcher;
pub mod models;
pub mod prioritize;
pub mod social;
pub mod sources;
pub mod storage;

pub use cache::{CacheManager, CacheRecord};
pub use config::{CacheConfig, SourceConfig};
pub use errors::{HistoryError, PublishError, RetryClass, SourceError, EXHAUSTED_MESSAGE};
pub use extract::{MarkupExtractor, RegexExtractor};
pub use fetcher::HistoryFetcher;
pub use models::{DayHistory, EntryLink, HistoricalEntry};
pub use social::{format_summary, PostOutcome, PublisherConfig, TikTokPublisher};
pub use storage::{KeyValueStore, MemoryStore};
