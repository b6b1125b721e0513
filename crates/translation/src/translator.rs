use std::sync::Arc;

use lazy_static::lazy_static;
use log::{debug, info, warn};
use oneul_core::{KeyValueStore, RetryClass};
use regex::Regex;

use crate::backends::{LibreTranslateBackend, MyMemoryBackend, TranslationBackend};
use crate::cache::TranslationCache;
use crate::config::TranslationConfig;
use crate::cooldown::CooldownState;

lazy_static! {
    static ref HANGUL: Regex = Regex::new(r"[가-힣]").expect("Invalid regex pattern");
    static ref LATIN: Regex = Regex::new(r"[a-zA-Z]").expect("Invalid regex pattern");
}

/// Text holding any Hangul syllable is already Korean; otherwise it needs
/// translating only if it has Latin letters.
pub fn needs_translation(text: &str) -> bool {
    !HANGUL.is_match(text) && LATIN.is_match(text)
}

/// Cache-first translator with primary retry, cooldown and a one-shot secondary.
pub struct Translator {
    primary: Arc<dyn TranslationBackend>,
    secondary: Arc<dyn TranslationBackend>,
    cache: TranslationCache,
    cooldown: Arc<CooldownState>,
    config: TranslationConfig,
}

impl Translator {
    pub fn new(
        primary: Arc<dyn TranslationBackend>,
        secondary: Arc<dyn TranslationBackend>,
        cache: TranslationCache,
        cooldown: Arc<CooldownState>,
        config: TranslationConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache,
            cooldown,
            config,
        }
    }

    /// Translator over the configured public endpoints.
    pub fn build(
        config: TranslationConfig,
        store: Arc<dyn KeyValueStore>,
        cooldown: Arc<CooldownState>,
    ) -> Self {
        let cache = TranslationCache::new(store, config.cache_key.clone(), config.cache_freshness);
        Self::new(
            Arc::new(MyMemoryBackend::new(&config)),
            Arc::new(LibreTranslateBackend::new(&config)),
            cache,
            cooldown,
            config,
        )
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn cooldown(&self) -> &Arc<CooldownState> {
        &self.cooldown
    }

    /// Whether translating `text` would hit the network.
    pub fn needs_live_call(&self, text: &str) -> bool {
        needs_translation(text)
            && text.chars().count() <= self.config.max_chars
            && self.cache.get(text).is_none()
    }

    /// Korean rendering of `text`, or `text` itself when no translation is
    /// needed or none could be obtained.
    pub async fn translate(&self, text: &str) -> String {
        if !needs_translation(text) {
            return text.to_string();
        }

        if let Some(cached) = self.cache.get(text) {
            debug!("Translation cache hit");
            return cached;
        }

        if text.chars().count() > self.config.max_chars {
            warn!(
                "Text exceeds {} characters, skipping translation",
                self.config.max_chars
            );
            return text.to_string();
        }

        if let Some(translated) = self.translate_primary(text).await {
            self.cache.put(text, &translated);
            return translated;
        }

        match self.secondary.translate(text).await {
            Ok(translated) => {
                self.cache.put(text, &translated);
                translated
            }
            Err(e) => {
                warn!(
                    "Translation failed, keeping original: {} ({})",
                    text.chars().take(50).collect::<String>(),
                    e
                );
                text.to_string()
            }
        }
    }

    /// Cached Korean rendering of `text`, or `text` itself. Never calls out.
    pub fn translate_cached(&self, text: &str) -> String {
        if !needs_translation(text) {
            return text.to_string();
        }
        self.cache.get(text).unwrap_or_else(|| text.to_string())
    }

    /// Translate `texts` one after another with `batch_delay` between calls.
    pub async fn translate_batch(&self, texts: &[String]) -> Vec<String> {
        let mut translated = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            translated.push(self.translate(text).await);
            if index + 1 < texts.len() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }
        translated
    }

    async fn translate_primary(&self, text: &str) -> Option<String> {
        if let Some(remaining) = self.cooldown.remaining() {
            debug!(
                "{} cooling down for {}s, skipping",
                self.primary.id(),
                remaining.as_secs()
            );
            return None;
        }

        for attempt in 0..self.config.max_attempts {
            let error = match self.primary.translate(text).await {
                Ok(translated) => return Some(translated),
                Err(e) => e,
            };

            match error.retry_class() {
                RetryClass::Cooldown => {
                    warn!("{} rate limited the request", self.primary.id());
                    self.cooldown.start(self.config.cooldown);
                    return None;
                }
                RetryClass::WithBackoff if attempt + 1 < self.config.max_attempts => {
                    let delay = self.config.retry_base_delay * (attempt + 1);
                    info!(
                        "{} failed ({}), retrying in {}ms",
                        self.primary.id(),
                        error,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                _ => {
                    debug!("{} gave up: {}", self.primary.id(), error);
                    return None;
                }
            }
        }
        None
    }
}
