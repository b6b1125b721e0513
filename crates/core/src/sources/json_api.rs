//! Generic on-this-day JSON API, reached directly or through a CORS relay.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use log::info;
use reqwest::Client;

use super::http::{build_client, get_text};
use super::HistorySource;
use crate::config::SourceConfig;
use crate::errors::SourceError;
use crate::models::DayHistory;

pub const SECONDARY_SOURCE_ID: &str = "MUFFINLABS";

/// Source returning `{date, url, data: {Events, Births, Deaths}}`.
pub struct JsonApiSource {
    id: String,
    client: Client,
    endpoint: String,
    relay_template: Option<String>,
}

impl JsonApiSource {
    /// Call the API directly.
    pub fn direct(config: &SourceConfig) -> Self {
        Self {
            id: SECONDARY_SOURCE_ID.to_string(),
            client: build_client(config),
            endpoint: config.secondary_url.trim_end_matches('/').to_string(),
            relay_template: None,
        }
    }

    /// Call the API through the relay at `template` (the encoded API URL is appended).
    pub fn relayed(config: &SourceConfig, template: &str, ordinal: usize) -> Self {
        Self {
            id: format!("{}_RELAY_{}", SECONDARY_SOURCE_ID, ordinal),
            client: build_client(config),
            endpoint: config.secondary_url.trim_end_matches('/').to_string(),
            relay_template: Some(template.to_string()),
        }
    }

    /// The direct source followed by one relayed source per configured template.
    pub fn fallback_chain(config: &SourceConfig) -> Vec<Self> {
        std::iter::once(Self::direct(config))
            .chain(
                config
                    .relay_templates
                    .iter()
                    .enumerate()
                    .map(|(i, template)| Self::relayed(config, template, i + 1)),
            )
            .collect()
    }

    fn request_url(&self, date: NaiveDate) -> String {
        let target = format!("{}/{}/{}", self.endpoint, date.month(), date.day());
        match &self.relay_template {
            Some(template) => format!("{}{}", template, urlencoding::encode(&target)),
            None => target,
        }
    }
}

#[async_trait]
impl HistorySource for JsonApiSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self, date: NaiveDate) -> Result<DayHistory, SourceError> {
        let body = get_text(&self.client, &self.id, &self.request_url(date), "application/json").await?;

        let history: DayHistory =
            serde_json::from_str::<DayHistory>(&body).map_err(|e| SourceError::Malformed {
                provider: self.id.clone(),
                message: e.to_string(),
            })?
            .without_blank_entries();

        info!(
            "{} returned {} events and {} births",
            self.id,
            history.events.len(),
            history.births.len()
        );
        Ok(history)
    }
}
