use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct StepsCommand;

#[async_trait]
impl Command for StepsCommand {
    fn name(&self) -> &str {
        "/steps"
    }

    fn description(&self) -> &str {
        "list the pipeline's steps in run order"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let Some(dashboard) = info.dashboard else {
            eprintln!("  ✗ pipeline not available");
            return CommandResult::Handled;
        };

        println!("  {} pipeline:", info.pipeline);
        for (i, step) in dashboard.steps().iter().enumerate() {
            let marker = if dashboard.focus() == Some(*step) {
                " ← focus"
            } else {
                ""
            };
            println!("  {}. {}{}", i + 1, step, marker);
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;

    #[tokio::test]
    async fn returns_handled_without_dashboard() {
        assert!(matches!(
            StepsCommand.execute("", &test_info()).await,
            CommandResult::Handled
        ));
    }
}
