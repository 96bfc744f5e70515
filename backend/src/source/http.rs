//! HTTP record source: `GET <url>` returning a JSON array of flight objects.

use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;

use super::error::{ErrorContext, SourceError, SourceResult};
use super::ingest::ingest_json_bytes;
use super::RecordSource;
use crate::models::Dataset;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches the flight table from a JSON endpoint.
///
/// Any non-2xx status is a hard failure; nothing is retried here.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for `url` with the default timeout.
    pub fn new(url: impl Into<String>) -> SourceResult<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a source for `url` with an explicit request timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> SourceResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(SourceError::configuration("HTTP source requires a URL"));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SourceError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self) -> SourceResult<Dataset> {
        debug!("Fetching flight table from {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Flight API {} answered {}", self.url, status);
            return Err(SourceError::unavailable_with_context(
                format!("Flight API answered HTTP {}", status.as_u16()),
                ErrorContext::new("http_fetch")
                    .with_source(self.url.clone())
                    .with_details(format!("status={}", status)),
            ));
        }

        let body = response.bytes().await?;
        ingest_json_bytes(&body, &self.url)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
