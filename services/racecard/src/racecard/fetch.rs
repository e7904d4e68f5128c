//! Single bounded-timeout retrieval of a racecard page

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::time::Duration;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{RacecardError, Result};
use crate::racecard::page::RacecardPage;

/// Source of racecard HTML
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<RacecardPage>;
}

/// Validate a user-supplied racecard URL. Only http(s) is accepted.
pub fn parse_race_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| RacecardError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RacecardError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Fetches over HTTP(S) with a browser-like user agent. No retries: a failed
/// request surfaces immediately.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let lang = HeaderValue::from_str(&config.accept_language)
            .map_err(|e| RacecardError::Transport(format!("bad Accept-Language header: {}", e)))?;
        headers.insert(ACCEPT_LANGUAGE, lang);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<RacecardPage> {
        tracing::debug!("Fetching racecard: {}", url);

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!("Racecard request returned {} for {}", status, url);
            return Err(RacecardError::Transport(format!("HTTP {} from {}", status, url)));
        }

        let body = response.text().await?;
        tracing::info!("Fetched {} bytes from {}", body.len(), url);

        Ok(RacecardPage {
            url: url.to_string(),
            fetched_ts: chrono::Utc::now().timestamp_millis(),
            body,
        })
    }
}
