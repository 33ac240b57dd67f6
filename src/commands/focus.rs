use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};
use crate::dashboard::Mode;

pub struct FocusCommand;

/// Resolve `arg` as a 1-based index or an exact step name.
fn resolve<'a>(arg: &str, steps: &[&'a str]) -> Option<&'a str> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 && n <= steps.len() => Some(steps[n - 1]),
        Ok(_) => None,
        Err(_) => steps.iter().copied().find(|s| s.eq_ignore_ascii_case(arg)),
    }
}

#[async_trait]
impl Command for FocusCommand {
    fn name(&self) -> &str {
        "/focus"
    }

    fn description(&self) -> &str {
        "pick which analysis runs, by number or name"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let Some(dashboard) = info.dashboard else {
            eprintln!("  ✗ focus selection not available");
            return CommandResult::Handled;
        };
        if dashboard.mode() == Mode::Sequence {
            println!("  the {} pipeline runs every step", info.pipeline);
            return CommandResult::Handled;
        }

        let steps = dashboard.steps();
        if args.is_empty() {
            println!("  Available focuses:\n");
            for (i, step) in steps.iter().enumerate() {
                let marker = if dashboard.focus() == Some(*step) {
                    " ← current"
                } else {
                    ""
                };
                println!("  {}. {}{}", i + 1, step, marker);
            }
            println!("\n  usage: /focus <number|name>");
            return CommandResult::Handled;
        }

        let Some(selected) = resolve(args, &steps) else {
            eprintln!("  ✗ invalid selection: {args}");
            return CommandResult::Handled;
        };

        if dashboard.focus() == Some(selected) {
            println!("  already focused on {selected}");
            return CommandResult::Handled;
        }

        println!("  ✓ focus changed to {selected}");
        CommandResult::StateChanged(StateChange::Focus(selected.to_string()))
    }
}
