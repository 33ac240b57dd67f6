use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::dashboard::render::render_table;

pub struct ShowCommand;

#[async_trait]
impl Command for ShowCommand {
    fn name(&self) -> &str {
        "/show"
    }

    fn aliases(&self) -> &[&str] {
        &["/results"]
    }

    fn description(&self) -> &str {
        "show every stored result as a table"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let Some(dashboard) = info.dashboard else {
            eprintln!("  ✗ results not available");
            return CommandResult::Handled;
        };

        match dashboard.show().await {
            Ok(entries) => print!("{}", render_table(&entries)),
            Err(e) => eprintln!("  ✗ failed to read results: {e:#}"),
        }
        CommandResult::Handled
    }
}
