use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::dashboard::render::render_table;

pub struct FindCommand;

#[async_trait]
impl Command for FindCommand {
    fn name(&self) -> &str {
        "/find"
    }

    fn description(&self) -> &str {
        "search stored results, e.g. /find fintech"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let Some(dashboard) = info.dashboard else {
            eprintln!("  ✗ search not available");
            return CommandResult::Handled;
        };
        if args.is_empty() {
            eprintln!("  usage: /find <text>");
            return CommandResult::Handled;
        }

        match dashboard.find(args).await {
            Ok(entries) if entries.is_empty() => println!("  nothing matches \"{args}\""),
            Ok(entries) => print!("{}", render_table(&entries)),
            Err(e) => eprintln!("  ✗ search failed: {e:#}"),
        }
        CommandResult::Handled
    }
}
