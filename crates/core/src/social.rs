//! Daily social-post summary and the short-video platform publisher.

use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::PublishError;
use crate::models::{DayHistory, HistoricalEntry};

pub const DEFAULT_PUBLISH_URL: &str = "https://open.tiktokapis.com/v2/post/publish/";
pub const HASHTAG_FOOTER: &str = "#역사 #오늘의역사 #한국역사 #역사스토리";

const SUMMARY_EVENTS: usize = 3;
const SUMMARY_BIRTHS: usize = 2;
const EVENT_TEXT_CHARS: usize = 80;
const BIRTH_TEXT_CHARS: usize = 60;
const TITLE_CHARS: usize = 150;
const PRIVACY_LEVEL: &str = "PUBLIC_TO_EVERYONE";

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Short Korean summary of `history` for a social post dated `date`.
pub fn format_summary(history: &DayHistory, date: NaiveDate) -> String {
    let mut text = format!("📅 {}월 {}일의 역사\n\n", date.month(), date.day());

    if !history.events.is_empty() {
        text.push_str("📜 주요 사건:\n");
        push_entries(&mut text, &history.events, SUMMARY_EVENTS, EVENT_TEXT_CHARS);
    }

    if !history.births.is_empty() {
        text.push_str("\n🎂 오늘 태어난 인물:\n");
        push_entries(&mut text, &history.births, SUMMARY_BIRTHS, BIRTH_TEXT_CHARS);
    }

    text.push('\n');
    text.push_str(HASHTAG_FOOTER);
    text
}

fn push_entries(out: &mut String, entries: &[HistoricalEntry], limit: usize, max_chars: usize) {
    for (index, entry) in entries.iter().take(limit).enumerate() {
        out.push_str(&format!(
            "{}. {}년: {}...\n",
            index + 1,
            entry.year,
            truncate_chars(&entry.text, max_chars)
        ));
    }
}

/// Publish endpoint and credentials.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PUBLISH_URL.to_string(),
            api_key: None,
            access_token: None,
        }
    }
}

/// Result of a publish attempt. Failures are reported here, never thrown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostOutcome {
    pub success: bool,
    pub message: String,
    pub content: String,
    #[serde(rename = "tiktokResult", skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// Posts summaries to the platform's content API. Never retries.
pub struct TikTokPublisher {
    client: Client,
    config: PublisherConfig,
}

impl TikTokPublisher {
    pub fn new(config: PublisherConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Both the API key and the access token are configured.
    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.config.api_key, &self.config.access_token) {
            (Some(key), Some(token)) if !key.is_empty() && !token.is_empty() => {
                Some((key.as_str(), token.as_str()))
            }
            _ => None,
        }
    }

    pub async fn publish(&self, content: &str) -> PostOutcome {
        let Some((_, token)) = self.credentials() else {
            info!("Publisher credentials not configured; returning content only");
            return PostOutcome {
                success: false,
                message: "TikTok API 키가 설정되지 않았습니다".to_string(),
                content: content.to_string(),
                result: None,
                error: None,
            };
        };

        match self.send(content, token).await {
            Ok(result) => {
                info!("Published daily summary");
                PostOutcome {
                    success: true,
                    message: "TikTok에 게시되었습니다".to_string(),
                    content: content.to_string(),
                    result: Some(result),
                    error: None,
                }
            }
            Err(PublishError::Rejected { status, body }) => {
                warn!("Publish endpoint rejected the post with HTTP {}", status);
                PostOutcome {
                    success: false,
                    message: "TikTok API 에러".to_string(),
                    content: content.to_string(),
                    result: None,
                    error: Some(body.unwrap_or_else(|| json!({ "status": status }))),
                }
            }
            Err(e) => {
                warn!("Publish request failed: {}", e);
                PostOutcome {
                    success: false,
                    message: "TikTok 게시 실패".to_string(),
                    content: content.to_string(),
                    result: None,
                    error: Some(Value::String(e.to_string())),
                }
            }
        }
    }

    async fn send(&self, content: &str, token: &str) -> Result<Value, PublishError> {
        let body = json!({
            "post_info": {
                "title": truncate_chars(content, TITLE_CHARS),
                "privacy_level": PRIVACY_LEVEL,
            }
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.ok();
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // Some successful responses carry no body.
        Ok(response.json::<Value>().await.unwrap_or(Value::Null))
    }
}
