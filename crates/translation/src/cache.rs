//! Persistent translation cache.
//!
//! All translations live in one JSON record keyed by the exact source text:
//! `{"<text>": {"translation": "...", "timestamp": <epoch ms>}}`. Expired
//! entries are dropped when they are read.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use oneul_core::KeyValueStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTranslation {
    pub translation: String,
    pub timestamp: i64,
}

type Entries = BTreeMap<String, CachedTranslation>;

#[derive(Clone)]
pub struct TranslationCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    freshness: Duration,
}

impl TranslationCache {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, freshness: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            freshness,
        }
    }

    pub fn get(&self, text: &str) -> Option<String> {
        self.get_at(text, Utc::now().timestamp_millis())
    }

    /// [`get`](Self::get) evaluated at `now_ms`.
    pub fn get_at(&self, text: &str, now_ms: i64) -> Option<String> {
        let mut entries = self.load();
        let cached = entries.get(text)?;

        if now_ms - cached.timestamp < self.freshness.as_millis() as i64 {
            return Some(cached.translation.clone());
        }

        debug!("Translation cache entry expired, removing");
        entries.remove(text);
        self.save(&entries);
        None
    }

    pub fn put(&self, text: &str, translation: &str) {
        self.put_at(text, translation, Utc::now().timestamp_millis());
    }

    pub fn put_at(&self, text: &str, translation: &str, timestamp: i64) {
        let mut entries = self.load();
        entries.insert(
            text.to_string(),
            CachedTranslation {
                translation: translation.to_string(),
                timestamp,
            },
        );
        self.save(&entries);
    }

    fn load(&self) -> Entries {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Entries::new(),
            Err(e) => {
                warn!("Failed to read translation cache: {}", e);
                return Entries::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Translation cache is unreadable ({}), starting empty", e);
            Entries::new()
        })
    }

    fn save(&self, entries: &Entries) {
        let written = serde_json::to_string(entries)
            .map_err(oneul_core::HistoryError::from)
            .and_then(|json| self.store.set(&self.key, &json));
        if let Err(e) = written {
            warn!("Failed to write translation cache: {}", e);
        }
    }
}
