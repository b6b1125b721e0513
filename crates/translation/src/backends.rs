//! Translation endpoints.

use async_trait::async_trait;
use log::debug;
use oneul_core::SourceError;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::config::TranslationConfig;
use crate::errors::TranslationError;

pub const MYMEMORY_ID: &str = "MYMEMORY";
pub const LIBRETRANSLATE_ID: &str = "LIBRETRANSLATE";

/// A remote endpoint that translates one text per call.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn id(&self) -> &str;

    async fn translate(&self, text: &str) -> Result<String, TranslationError>;
}

fn build_client(config: &TranslationConfig) -> Client {
    Client::builder()
        .timeout(config.request_timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn check_status(provider: &str, response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited {
            provider: provider.to_string(),
        });
    }
    if !status.is_success() {
        return Err(SourceError::Http {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Keep a translation only if it is non-blank and differs from the input.
fn usable(provider: &str, original: &str, translated: Option<String>) -> Result<String, TranslationError> {
    match translated {
        Some(t) if !t.trim().is_empty() && t != original => Ok(t),
        _ => Err(TranslationError::NoTranslation {
            provider: provider.to_string(),
        }),
    }
}

/// MyMemory public API (`GET ?q=...&langpair=en|ko`).
pub struct MyMemoryBackend {
    client: Client,
    url: String,
    langpair: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<MyMemoryData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryData {
    translated_text: Option<String>,
}

impl MyMemoryBackend {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            client: build_client(config),
            url: config.primary_url.clone(),
            langpair: format!("{}|{}", config.source_lang, config.target_lang),
        }
    }
}

#[async_trait]
impl TranslationBackend for MyMemoryBackend {
    fn id(&self) -> &str {
        MYMEMORY_ID
    }

    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        debug!("{} translating {} chars", MYMEMORY_ID, text.chars().count());
        let response = self
            .client
            .get(&self.url)
            .query(&[("q", text), ("langpair", self.langpair.as_str())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(MYMEMORY_ID, e))?;

        let body: MyMemoryResponse = check_status(MYMEMORY_ID, response)?
            .json()
            .await
            .map_err(|e| SourceError::from_reqwest(MYMEMORY_ID, e))?;

        let translated = body.response_data.and_then(|d| d.translated_text);
        usable(MYMEMORY_ID, text, translated)
    }
}

/// LibreTranslate (`POST {q, source, target, format}`).
pub struct LibreTranslateBackend {
    client: Client,
    url: String,
    source: String,
    target: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibreTranslateResponse {
    translated_text: Option<String>,
}

impl LibreTranslateBackend {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            client: build_client(config),
            url: config.secondary_url.clone(),
            source: config.source_lang.clone(),
            target: config.target_lang.clone(),
        }
    }
}

#[async_trait]
impl TranslationBackend for LibreTranslateBackend {
    fn id(&self) -> &str {
        LIBRETRANSLATE_ID
    }

    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        debug!("{} translating {} chars", LIBRETRANSLATE_ID, text.chars().count());
        let response = self
            .client
            .post(&self.url)
            .json(&json!({
                "q": text,
                "source": self.source,
                "target": self.target,
                "format": "text",
            }))
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(LIBRETRANSLATE_ID, e))?;

        let body: LibreTranslateResponse = check_status(LIBRETRANSLATE_ID, response)?
            .json()
            .await
            .map_err(|e| SourceError::from_reqwest(LIBRETRANSLATE_ID, e))?;

        usable(LIBRETRANSLATE_ID, text, body.translated_text)
    }
}
