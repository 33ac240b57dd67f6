//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Default Anthropic model when none is specified.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// How long a page fetch may take before it is abandoned.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Prefix of the text the fetcher returns instead of page content on failure.
pub const SCRAPE_ERROR_PREFIX: &str = "Error during scraping:";

/// Number of characters of fetched content shown before a run's results.
pub const PREVIEW_CHARS: usize = 500;

/// Marker appended to a truncated preview.
pub const ELLIPSIS: &str = "...";

/// Default database path: `~/.dealflow/dealflow.db`.
/// Single DB for results and config.
pub fn default_db_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".dealflow").join("dealflow.db"))
}

/// Format a number with comma separators (e.g. 1,234,567).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// First `max_chars` characters of `text`, with [`ELLIPSIS`] appended when
/// anything was cut. Counts chars, not bytes.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consts_are_non_empty() {
        assert!(!AUTHOR.is_empty());
        assert!(!HOMEPAGE.is_empty());
        assert!(!REPO.is_empty());
        assert!(!DEFAULT_MODEL.is_empty());
    }

    #[test]
    fn consts_from_cargo_toml() {
        assert!(REPO.contains("dealflow"));
    }

    #[test]
    fn default_db_path_is_under_dot_dir() {
        if let Some(path) = default_db_path() {
            assert!(path.ends_with(".dealflow/dealflow.db"));
        }
    }

    #[test]
    fn format_number_small() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
    }

    #[test]
    fn format_number_thousands() {
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(123_456), "123,456");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn preview_short_text_untouched() {
        assert_eq!(preview("Hello World", PREVIEW_CHARS), "Hello World");
    }

    #[test]
    fn preview_exact_length_untouched() {
        let text = "a".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&text, PREVIEW_CHARS), text);
    }

    #[test]
    fn preview_truncates_with_ellipsis() {
        let text = "b".repeat(PREVIEW_CHARS + 20);
        let shown = preview(&text, PREVIEW_CHARS);
        assert_eq!(shown.len(), PREVIEW_CHARS + ELLIPSIS.len());
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(preview(&text, 3), "ééé...");
    }
}
