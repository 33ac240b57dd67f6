use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::completer::TokenUsage;
use crate::consts::format_number;

pub struct TokensCommand;

fn usage_line(model: &str, usage: TokenUsage) -> String {
    if usage.total() == 0 {
        return format!("{model}: nothing spent yet, paste a URL to run the pipeline");
    }
    format!(
        "{model}: {} prompt + {} completion = {} tokens",
        format_number(usage.input_tokens),
        format_number(usage.output_tokens),
        format_number(usage.total()),
    )
}

#[async_trait]
impl Command for TokensCommand {
    fn name(&self) -> &str {
        "/tokens"
    }

    fn aliases(&self) -> &[&str] {
        &["/usage"]
    }

    fn description(&self) -> &str {
        "tokens spent on analyses this session"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        println!("  {}", usage_line(info.model, info.usage));
        CommandResult::Handled
    }
}
