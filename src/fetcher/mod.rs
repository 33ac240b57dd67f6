pub mod http;
pub mod mock;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::consts::SCRAPE_ERROR_PREFIX;

/// Turns a URL into plain text. Never fails: problems come back as an
/// error marker string (see [`scrape_error`]) so downstream steps always
/// receive text.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> String;
}

/// The text returned in place of page content when a fetch fails.
pub fn scrape_error(cause: impl std::fmt::Display) -> String {
    format!("{SCRAPE_ERROR_PREFIX} {cause}")
}

/// Whether `text` is a fetch failure marker rather than page content.
pub fn is_scrape_error(text: &str) -> bool {
    text.starts_with(SCRAPE_ERROR_PREFIX)
}

/// Concatenate the text of every `<p>` element in document order, joined by
/// single spaces. Text inside a paragraph is kept as written.
pub fn extract_paragraphs(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
