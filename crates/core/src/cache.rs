//! Day cache: one JSON record per calendar date with a capture timestamp.
//!
//! Reads for the current day enforce the freshness window and the record
//! shape; anything that fails either check is deleted. The stale scan used
//! as a last resort only checks the shape. Writes never fail the caller.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::CacheConfig;
use crate::dates::date_key;
use crate::errors::HistoryError;
use crate::models::DayHistory;
use crate::storage::KeyValueStore;

/// Persisted form of a cached day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    #[serde(rename = "data")]
    pub payload: DayHistory,
    #[serde(rename = "timestamp")]
    pub captured_at_ms: i64,
}

/// Date-keyed cache of processed [`DayHistory`] values.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn KeyValueStore>,
    config: CacheConfig,
}

impl CacheManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    pub fn with_config(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Storage key for `date`, e.g. `history_data_2025-11-02`.
    pub fn key_for(&self, date: NaiveDate) -> String {
        format!("{}{}", self.config.key_prefix, date_key(date))
    }

    /// Fresh, well-formed record for `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<CacheRecord> {
        self.get_at(date, Utc::now().timestamp_millis())
    }

    /// [`get`](Self::get) evaluated at `now_ms`.
    pub fn get_at(&self, date: NaiveDate, now_ms: i64) -> Option<CacheRecord> {
        let key = self.key_for(date);
        let raw = self.read_raw(&key)?;

        let record = match serde_json::from_str::<CacheRecord>(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("Cache record '{}' has an invalid shape ({}), deleting", key, e);
                self.delete(&key);
                return None;
            }
        };

        let age_ms = now_ms - record.captured_at_ms;
        let freshness_ms = self.config.freshness.as_millis() as i64;
        if age_ms >= freshness_ms {
            debug!("Cache record '{}' expired ({} ms old), deleting", key, age_ms);
            self.delete(&key);
            return None;
        }

        debug!("Cache hit for '{}'", key);
        Some(record)
    }

    /// Store `history` for `date`, overwriting any existing record.
    ///
    /// Persistence failures are logged and swallowed.
    pub fn put(&self, date: NaiveDate, history: &DayHistory) {
        self.put_at(date, history, Utc::now().timestamp_millis());
    }

    /// [`put`](Self::put) with an explicit capture time.
    pub fn put_at(&self, date: NaiveDate, history: &DayHistory, captured_at_ms: i64) {
        let key = self.key_for(date);
        let record = CacheRecord {
            payload: history.clone(),
            captured_at_ms,
        };

        let written = serde_json::to_string(&record)
            .map_err(HistoryError::from)
            .and_then(|json| self.store.set(&key, &json));

        match written {
            Ok(()) => {
                debug!("Cached history under '{}'", key);
                self.evict_older_than(date);
            }
            Err(e) => warn!("Failed to write cache record '{}': {}", key, e),
        }
    }

    /// Well-formed record for `date` regardless of age.
    ///
    /// Read-only: nothing is deleted here.
    pub fn get_stale(&self, date: NaiveDate) -> Option<DayHistory> {
        let key = self.key_for(date);
        let raw = self.read_raw(&key)?;
        match serde_json::from_str::<CacheRecord>(&raw) {
            Ok(record) => Some(record.payload),
            Err(e) => {
                debug!("Skipping malformed stale record '{}': {}", key, e);
                None
            }
        }
    }

    /// Delete day records dated before `today - lookback_days`.
    ///
    /// Returns the number of records removed. Keys under the prefix whose
    /// suffix is not a date are left alone.
    pub fn evict_older_than(&self, today: NaiveDate) -> usize {
        let cutoff = today - Duration::days(i64::from(self.config.lookback_days));
        let keys = match self.store.keys_with_prefix(&self.config.key_prefix) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list cache records: {}", e);
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            let suffix = &key[self.config.key_prefix.len()..];
            let Ok(date) = NaiveDate::parse_from_str(suffix, "%Y-%m-%d") else {
                continue;
            };
            if date < cutoff {
                self.delete(&key);
                removed += 1;
            }
        }

        if removed > 0 {
            info!("Evicted {} cache records older than {}", removed, cutoff);
        }
        removed
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read cache record '{}': {}", key, e);
                self.delete(key);
                None
            }
        }
    }

    fn delete(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!("Failed to delete cache record '{}': {}", key, e);
        }
    }
}
