//! Primary source: the localized encyclopedia's rendered day page.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::info;
use reqwest::Client;

use super::http::{build_client, get_text};
use super::HistorySource;
use crate::config::SourceConfig;
use crate::dates::{display_label, localized_slug};
use crate::errors::SourceError;
use crate::extract::{MarkupExtractor, RegexExtractor};
use crate::models::DayHistory;

pub const PRIMARY_SOURCE_ID: &str = "KO_WIKIPEDIA";

/// Fetches `{base}/api/rest_v1/page/html/{M월_D일}` and runs the extractor.
pub struct WikipediaSource {
    client: Client,
    base_url: String,
    extractor: Arc<dyn MarkupExtractor>,
}

impl WikipediaSource {
    pub fn new(config: &SourceConfig) -> Self {
        let base_url = config.wiki_base_url.trim_end_matches('/').to_string();
        Self {
            client: build_client(config),
            extractor: Arc::new(RegexExtractor::new(base_url.clone())),
            base_url,
        }
    }

    /// Use a different extractor (e.g. a structured HTML parser).
    pub fn with_extractor(mut self, extractor: Arc<dyn MarkupExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    fn page_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/api/rest_v1/page/html/{}",
            self.base_url,
            urlencoding::encode(&localized_slug(date))
        )
    }

    fn article_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/wiki/{}",
            self.base_url,
            urlencoding::encode(&localized_slug(date))
        )
    }
}

#[async_trait]
impl HistorySource for WikipediaSource {
    fn id(&self) -> &str {
        PRIMARY_SOURCE_ID
    }

    async fn fetch(&self, date: NaiveDate) -> Result<DayHistory, SourceError> {
        let markup = get_text(&self.client, PRIMARY_SOURCE_ID, &self.page_url(date), "text/html").await?;
        let sections = self.extractor.extract(&markup);

        if sections.is_empty() {
            return Err(SourceError::Empty {
                provider: PRIMARY_SOURCE_ID.to_string(),
            });
        }

        info!(
            "Extracted {} events and {} births from {}",
            sections.events.len(),
            sections.births.len(),
            PRIMARY_SOURCE_ID
        );

        Ok(DayHistory {
            date: display_label(date),
            source_url: self.article_url(date),
            events: sections.events,
            births: sections.births,
            deaths: Vec::new(),
        })
    }
}
