use std::time::Duration;

pub const DEFAULT_PRIMARY_URL: &str = "https://api.mymemory.translated.net/get";
pub const DEFAULT_SECONDARY_URL: &str = "https://libretranslate.de/translate";

/// Translation endpoints, limits and pacing.
#[derive(Debug, Clone)]
pub struct TranslationConfig {
    /// GET endpoint taking `q` and `langpair`.
    pub primary_url: String,
    /// POST endpoint taking `{q, source, target, format}`.
    pub secondary_url: String,
    pub source_lang: String,
    pub target_lang: String,
    /// Texts longer than this many characters are returned untranslated.
    pub max_chars: usize,
    /// Attempts against the primary endpoint, including the first.
    pub max_attempts: u32,
    /// Delay before retry `n` is `retry_base_delay * n`.
    pub retry_base_delay: Duration,
    /// How long the primary endpoint is skipped after a rate-limit response.
    pub cooldown: Duration,
    pub request_timeout: Duration,
    /// Storage key of the translation cache record.
    pub cache_key: String,
    pub cache_freshness: Duration,
    /// Pause between items of [`Translator::translate_batch`](crate::Translator::translate_batch).
    pub batch_delay: Duration,
    pub bulk: BulkPacing,
}

/// Limits and delays of [`translate_history`](crate::translate_history).
#[derive(Debug, Clone)]
pub struct BulkPacing {
    pub events: usize,
    pub births: usize,
    /// Once, before the first item, unless every item is already cached.
    pub initial_delay: Duration,
    /// Before each item after the first that needs a live call.
    pub item_delay: Duration,
    /// Between events and births, when any birth needs a live call.
    pub section_delay: Duration,
}

impl Default for BulkPacing {
    fn default() -> Self {
        Self {
            events: 5,
            births: 4,
            initial_delay: Duration::from_secs(2),
            item_delay: Duration::from_secs(15),
            section_delay: Duration::from_secs(20),
        }
    }
}

impl BulkPacing {
    /// No delays, same limits.
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            item_delay: Duration::ZERO,
            section_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            secondary_url: DEFAULT_SECONDARY_URL.to_string(),
            source_lang: "en".to_string(),
            target_lang: "ko".to_string(),
            max_chars: 500,
            max_attempts: 2,
            retry_base_delay: Duration::from_secs(30),
            cooldown: Duration::from_secs(10 * 60),
            request_timeout: Duration::from_secs(30),
            cache_key: "history_translations_cache".to_string(),
            cache_freshness: Duration::from_secs(7 * 24 * 60 * 60),
            batch_delay: Duration::from_millis(200),
            bulk: BulkPacing::default(),
        }
    }
}
