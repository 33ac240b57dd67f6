use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Fetcher, extract_paragraphs, scrape_error};

const USER_AGENT: &str = concat!("dealflow/", env!("CARGO_PKG_VERSION"));

/// Fetches a page over HTTP(S) and reduces it to paragraph text.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            // Still parse the body, error pages have paragraphs too.
            warn!(%url, %status, "non-success status while fetching");
        }
        let body = resp.text().await?;
        Ok(body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> String {
        debug!(%url, "fetching");
        match self.get(url).await {
            Ok(html) => {
                let text = extract_paragraphs(&html);
                debug!(%url, chars = text.len(), "fetched");
                text
            }
            Err(e) => {
                warn!(%url, error = %e, "fetch failed");
                scrape_error(e)
            }
        }
    }
}
