//! Shared HTTP plumbing for sources.

use log::debug;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};

use crate::config::SourceConfig;
use crate::errors::SourceError;

/// Build the HTTP client used by every source.
pub fn build_client(config: &SourceConfig) -> Client {
    Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// GET `url` and return the body of a successful response.
pub(crate) async fn get_text(
    client: &Client,
    provider: &str,
    url: &str,
    accept: &'static str,
) -> Result<String, SourceError> {
    debug!("{} request: {}", provider, url);

    let response = client
        .get(url)
        .header(ACCEPT, accept)
        .send()
        .await
        .map_err(|e| SourceError::from_reqwest(provider, e))?;

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

    response
        .text()
        .await
        .map_err(|e| SourceError::from_reqwest(provider, e))
}
