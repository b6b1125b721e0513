use std::{net::SocketAddr, time::Duration};

use oneul_core::{PublisherConfig, SourceConfig};
use oneul_translation::TranslationConfig;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Bearer secret guarding the posting trigger. Unguarded when absent.
    pub cron_secret: Option<String>,
    /// How often the refresher checks for a calendar date change.
    pub refresh_interval: Duration,
    pub sources: SourceConfig,
    pub translation: TranslationConfig,
    pub publisher: PublisherConfig,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("ONEUL_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .expect("Invalid ONEUL_LISTEN_ADDR");
        let db_path = std::env::var("ONEUL_DB_PATH").unwrap_or_else(|_| "./db/oneul.db".into());
        let cors_allow = std::env::var("ONEUL_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("ONEUL_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let refresh_secs: u64 = std::env::var("ONEUL_REFRESH_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .unwrap_or(60);

        let mut sources = SourceConfig::default();
        if let Some(url) = env_opt("ONEUL_WIKI_BASE_URL") {
            sources.wiki_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = env_opt("ONEUL_SECONDARY_URL") {
            sources.secondary_url = url;
        }

        let mut translation = TranslationConfig::default();
        if let Some(url) = env_opt("ONEUL_TRANSLATE_PRIMARY_URL") {
            translation.primary_url = url;
        }
        if let Some(url) = env_opt("ONEUL_TRANSLATE_SECONDARY_URL") {
            translation.secondary_url = url;
        }

        let mut publisher = PublisherConfig {
            api_key: env_opt("TIKTOK_API_KEY"),
            access_token: env_opt("TIKTOK_ACCESS_TOKEN"),
            ..PublisherConfig::default()
        };
        if let Some(url) = env_opt("ONEUL_PUBLISH_URL") {
            publisher.endpoint = url;
        }

        Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            cron_secret: env_opt("CRON_SECRET"),
            refresh_interval: Duration::from_secs(refresh_secs.max(1)),
            sources,
            translation,
            publisher,
        }
    }
}
