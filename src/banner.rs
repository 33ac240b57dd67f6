//! Startup banner and session summary display.

use crate::consts::{AUTHOR, HOMEPAGE, REPO, format_number};
use crate::completer::TokenUsage;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub pipeline: &'a str,
    pub steps: &'a [&'a str],
    pub model: &'a str,
    pub auth_status: &'a str,
    pub database: &'a str,
    pub search: &'a str,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║            D E A L F L O W            ║
   ║   pages in, investment memos out      ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   pipeline  {} ({})
   model     {}
   auth      {}
   database  {}
   search    {}

   paste a URL to analyze it, /show for stored results, /help for more
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.pipeline,
        info.steps.join(" → "),
        info.model,
        info.auth_status,
        info.database,
        info.search,
    );
}

/// Print the session summary (token usage + farewell).
pub fn print_session_summary(usage: TokenUsage) {
    if usage.total() > 0 {
        println!(
            "session: {:>6} input + {:>6} output = {:>6} tokens",
            format_number(usage.input_tokens),
            format_number(usage.output_tokens),
            format_number(usage.total()),
        );
    }
    println!("goodbye.");
}
