use crate::client::{PURPOSE_HEADER, Purpose};
use crate::error::{Result, ScrapeError};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// Downloads the sitemap document. A single attempt, no retries.
pub struct SitemapFetcher {
    client: Client,
    timeout: Duration,
}

impl SitemapFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn fetch(&self, sitemap_url: &str) -> Result<String> {
        let url = Url::parse(sitemap_url)
            .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", sitemap_url, e)))?;

        info!("Fetching sitemap {}", url);
        let start = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .header(PURPOSE_HEADER, Purpose::SitemapFetch.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(
            "Sitemap {} returned {} bytes in {:?}",
            url,
            body.len(),
            start.elapsed()
        );

        Ok(body)
    }
}
