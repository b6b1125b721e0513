use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use oneul_core::{CacheManager, HistoryFetcher, KeyValueStore, TikTokPublisher};
use oneul_storage_sqlite::SqliteKeyValueStore;
use oneul_translation::{CooldownState, Translator};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub fetcher: HistoryFetcher,
    pub translator: Arc<Translator>,
    pub publisher: Arc<TikTokPublisher>,
    pub cron_secret: Option<String>,
    /// Calendar date of the last successful load, used by the refresher.
    pub last_loaded: Mutex<Option<NaiveDate>>,
}

impl AppState {
    pub fn mark_loaded(&self, date: NaiveDate) {
        *self
            .last_loaded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(date);
    }

    pub fn loaded_on(&self) -> Option<NaiveDate> {
        *self
            .last_loaded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("ONEUL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::open(&config.db_path)?);
    tracing::info!("Database path in use: {}", config.db_path);

    let fetcher = HistoryFetcher::build(&config.sources, CacheManager::new(store.clone()));
    let translator = Translator::build(
        config.translation.clone(),
        store,
        Arc::new(CooldownState::new()),
    );
    let publisher = TikTokPublisher::new(config.publisher.clone());
    if !publisher.is_configured() {
        tracing::info!("Publisher credentials not set; posts will only be formatted");
    }

    Ok(Arc::new(AppState {
        fetcher,
        translator: Arc::new(translator),
        publisher: Arc::new(publisher),
        cron_secret: config.cron_secret.clone(),
        last_loaded: Mutex::new(None),
    }))
}
