//! Summary fetcher implementation
//!
//! This module handles all requests to the summary API, including:
//! - Building the shared HTTP client
//! - Encoding topics into summary endpoint URLs
//! - Retry logic for transient failures
//! - Classification of terminal outcomes

use crate::config::Config;
use crate::topics::Topic;
use crate::{ConfigError, RelayError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Ceiling on any single request made through the shared client
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for one summary fetch attempt
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the summary endpoint below the API host
const SUMMARY_PATH: [&str; 4] = ["api", "rest_v1", "page", "summary"];

const DEFAULT_TITLE: &str = "No Title";
const DEFAULT_EXTRACT: &str = "No summary available.";

/// A fetched topic summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub title: String,
    pub extract: String,
    /// Desktop article URL, if the API provided one
    pub page_url: Option<String>,
}

/// Terminal result of fetching one topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The summary was fetched
    Success(SummaryResult),

    /// The API has no page for this topic
    NotFound,

    /// Every allowed attempt failed
    ExhaustedRetries,
}

/// Subset of the summary API response we read
#[derive(Debug, Deserialize)]
struct SummaryPayload {
    title: Option<String>,
    extract: Option<String>,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<PlatformUrls>,
}

#[derive(Debug, Deserialize)]
struct PlatformUrls {
    page: Option<String>,
}

impl From<SummaryPayload> for SummaryResult {
    fn from(payload: SummaryPayload) -> Self {
        let page_url = payload
            .content_urls
            .and_then(|urls| urls.desktop)
            .and_then(|desktop| desktop.page)
            .filter(|page| !page.is_empty());

        Self {
            title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            extract: payload
                .extract
                .unwrap_or_else(|| DEFAULT_EXTRACT.to_string()),
            page_url,
        }
    }
}

/// Builds the HTTP client shared by every fetch and notification
///
/// The client sets no per-host connection cap; the pipeline's concurrency
/// gate is the only limiter.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(CLIENT_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the summary endpoint URL for a topic
///
/// The topic is percent-encoded as a single path segment, so `/`, `?` and `#`
/// in a topic never change the request path.
///
/// # Returns
///
/// * `Ok(Url)` - The summary URL
/// * `Err(ConfigError)` - `base` cannot carry a path (e.g. `mailto:`)
pub fn summary_url(base: &Url, topic: &Topic) -> Result<Url, ConfigError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ConfigError::InvalidUrl(format!("cannot be a base URL: {}", base)))?
        .pop_if_empty()
        .extend(SUMMARY_PATH)
        .push(topic.as_str());
    Ok(url)
}

/// Fetches topic summaries with a bounded number of attempts
#[derive(Debug, Clone)]
pub struct SummaryFetcher {
    client: Client,
    base_url: Url,
    max_retries: u32,
    attempt_timeout: Duration,
}

impl SummaryFetcher {
    /// Creates a fetcher for the configured summary API
    pub fn new(client: Client, config: &Config) -> Result<Self, RelayError> {
        let base_url = Url::parse(&config.wiki_api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(format!(
                "wiki_api_url cannot be a base URL: {}",
                config.wiki_api_url
            ))
            .into());
        }

        Ok(Self {
            client,
            base_url,
            max_retries: config.max_retries,
            attempt_timeout: ATTEMPT_TIMEOUT,
        })
    }

    /// Overrides the per-attempt timeout
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Fetches one topic's summary
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 with JSON body | Immediate → Success |
    /// | HTTP 404 | Immediate → NotFound |
    /// | Any other status | Retry |
    /// | Undecodable body | Retry |
    /// | Timeout / transport error | Retry |
    ///
    /// Attempts are numbered `1..=max_retries` and run back to back. When the
    /// last one fails the outcome is `ExhaustedRetries`; with `max_retries = 0`
    /// no request is made at all.
    pub async fn fetch(&self, topic: &Topic) -> FetchOutcome {
        let url = match summary_url(&self.base_url, topic) {
            Ok(url) => url,
            Err(e) => {
                // Unreachable after new(), which rejects such bases
                tracing::error!("Cannot build summary URL for {}: {}", topic, e);
                return FetchOutcome::ExhaustedRetries;
            }
        };

        for attempt in 1..=self.max_retries {
            match self.attempt(&url).await {
                Ok(Some(summary)) => {
                    tracing::info!("✅ Fetched: {}", topic);
                    return FetchOutcome::Success(summary);
                }
                Ok(None) => {
                    tracing::info!("❌ Not found: {}", topic);
                    return FetchOutcome::NotFound;
                }
                Err(e) => {
                    tracing::warn!(
                        "[Retry {}/{}] {} failed: {}",
                        attempt,
                        self.max_retries,
                        topic,
                        e
                    );
                }
            }
        }

        tracing::warn!(
            "❌ Failed to fetch {} after {} attempts",
            topic,
            self.max_retries
        );
        FetchOutcome::ExhaustedRetries
    }

    /// Performs a single request
    ///
    /// # Returns
    ///
    /// * `Ok(Some(SummaryResult))` - HTTP 200 with a decodable body
    /// * `Ok(None)` - HTTP 404
    /// * `Err(RelayError)` - A retryable failure
    async fn attempt(&self, url: &Url) -> Result<Option<SummaryResult>, RelayError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.attempt_timeout)
            .send()
            .await
            .map_err(|e| RelayError::from_transport(url.as_str(), e))?;

        match response.status() {
            StatusCode::OK => {
                let payload: SummaryPayload = response.json().await.map_err(|e| {
                    if e.is_timeout() {
                        RelayError::Timeout {
                            url: url.to_string(),
                        }
                    } else {
                        RelayError::Decode {
                            url: url.to_string(),
                            source: e,
                        }
                    }
                })?;
                Ok(Some(payload.into()))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(RelayError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}
