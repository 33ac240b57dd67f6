use async_trait::async_trait;
use std::sync::Mutex;

use super::Fetcher;

/// A fetcher for tests. Returns the same text for every URL and remembers
/// which URLs were asked for.
pub struct StaticFetcher {
    content: String,
    urls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// URLs fetched so far, in call order.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> String {
        if let Ok(mut urls) = self.urls.lock() {
            urls.push(url.to_string());
        }
        self.content.clone()
    }
}
