use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct QuitCommand;

/// Where the session's results end up once the dashboard closes.
fn farewell(db_path: &str) -> String {
    if db_path == ":memory:" {
        "results were kept in memory only and are gone now".to_string()
    } else {
        format!("results saved in {db_path}")
    }
}

#[async_trait]
impl Command for QuitCommand {
    fn name(&self) -> &str {
        "/quit"
    }

    fn aliases(&self) -> &[&str] {
        &["/q", "/exit"]
    }

    fn description(&self) -> &str {
        "close the dashboard"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        println!("  {}", farewell(info.db_path));
        CommandResult::Quit
    }
}
