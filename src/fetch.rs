//! This module provides a client to download a published iCalendar feed

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use url::Url;

use crate::error::Error;
use crate::ical::CALENDAR_MARKER;
use crate::traits::EventSource;

/// Default number of extra attempts on one endpoint after its first failure
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default pause between two attempts on the same endpoint
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// A feed source that downloads its data over HTTP.
///
/// The fetcher walks its endpoints in order: the feed URL itself first, then
/// any fallback mirrors. Each endpoint gets `1 + max_retries` attempts (with a
/// fixed pause in between) before the next one is considered; the retry budget
/// is per-endpoint, nothing is shared across them. The first body containing
/// the `BEGIN:VCALENDAR` marker wins, so a relay that answers 200 with an HTML
/// error page counts as a failure.
pub struct FeedFetcher {
    http: reqwest::Client,
    endpoints: Vec<Url>,
    max_retries: u32,
    retry_delay: Duration,
}

impl FeedFetcher {
    /// Create a fetcher for a feed URL and its optional fallback endpoints.
    ///
    /// The `reqwest::Client` is injected rather than built here, so that an
    /// application constructs one at startup and shares its connection pool.
    pub fn new(http: reqwest::Client, feed_url: Url, fallback_urls: Vec<Url>) -> Self {
        let mut endpoints = vec![feed_url];
        endpoints.extend(fallback_urls);

        Self {
            http,
            endpoints,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Override the per-endpoint retry budget and the pause between attempts
    pub fn with_retry_policy(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    async fn attempt(&self, endpoint: &Url) -> Result<String, String> {
        let response = self
            .http
            .get(endpoint.as_str())
            .header(ACCEPT, "text/calendar, text/plain")
            .send()
            .await
            .map_err(|err| err.to_string())?;
        let response = response.error_for_status().map_err(|err| err.to_string())?;
        let text = response.text().await.map_err(|err| err.to_string())?;

        if text.contains(CALENDAR_MARKER) == false {
            return Err("response is not an iCalendar document".to_string());
        }

        Ok(text)
    }
}

#[async_trait]
impl EventSource for FeedFetcher {
    /// Download the raw feed.
    ///
    /// Fails with [`Error::FetchExhausted`] once every endpoint ran out of
    /// attempts; the error carries the last underlying failure, since the
    /// earlier ones were only worth a log line.
    async fn fetch_raw(&self) -> Result<String, Error> {
        let mut attempts = 0;
        let mut last_error = String::from("no endpoint configured");

        for endpoint in &self.endpoints {
            for attempt in 0..=self.max_retries {
                if attempt > 0 {
                    tokio::time::sleep(self.retry_delay).await;
                }
                attempts += 1;

                match self.attempt(endpoint).await {
                    Ok(text) => {
                        log::debug!("Fetched {} bytes from {}", text.len(), endpoint);
                        return Ok(text);
                    }
                    Err(err) => {
                        log::warn!(
                            "Endpoint {} failed (attempt {}/{}): {}",
                            endpoint,
                            attempt + 1,
                            self.max_retries + 1,
                            err
                        );
                        last_error = err;
                    }
                }
            }
        }

        Err(Error::FetchExhausted {
            attempts,
            last_error,
        })
    }
}
