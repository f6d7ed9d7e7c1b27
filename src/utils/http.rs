use anyhow::Result;
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use tracing::warn;

use crate::config::Config;
use crate::error::ScrapeError;

pub fn create_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .pool_max_idle_per_host(6)
        .build()?;

    Ok(client)
}

/// Single-attempt fetch. The first failed request aborts the collection run
/// that issued it; a non-success status counts as a failure.
pub async fn fetch(client: &Client, url: &str) -> Result<Response, ScrapeError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!("HTTP error {}: {}", status, url);
    }

    response.error_for_status().map_err(|source| ScrapeError::Fetch {
        url: url.to_string(),
        source,
    })
}
