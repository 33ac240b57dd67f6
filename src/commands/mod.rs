//! Dashboard commands prefixed with `/`.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`]. The registry handles dispatch, alias resolution,
//! and help generation. Anything that isn't a command is a submit.

mod find;
mod focus;
mod help;
mod quit;
mod show;
mod steps;
mod tokens;

use async_trait::async_trait;
use std::sync::Arc;

use crate::completer::TokenUsage;
use crate::dashboard::Dashboard;

/// Session info available to commands during execution.
pub struct SessionInfo<'a> {
    pub pipeline: &'a str,
    pub model: &'a str,
    pub db_path: &'a str,
    pub usage: TokenUsage,
    /// Dashboard reference for commands that read the store or registry.
    pub dashboard: Option<&'a Dashboard>,
}

/// A state change the REPL needs to apply after a command runs.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// The research focus changed (new step name).
    Focus(String),
}

/// What the REPL should do after a command runs.
#[derive(Debug)]
pub enum CommandResult {
    /// Not a command, submit the input.
    NotACommand,
    /// Command handled, continue the REPL loop.
    Handled,
    /// Command produced a state change the REPL must apply.
    StateChanged(StateChange),
    /// Exit the REPL.
    Quit,
}

/// A dashboard command. Implement this trait to add new commands.
#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/show"`.
    fn name(&self) -> &str;

    /// Alternative names, e.g. `&["/h", "/?"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `/help`.
    fn description(&self) -> &str;

    /// Run the command. `args` is whatever followed the command name.
    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult;
}

/// Holds registered commands.
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a registry with all built-in commands.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(help::HelpCommand),
            Arc::new(show::ShowCommand),
            Arc::new(find::FindCommand),
            Arc::new(steps::StepsCommand),
            Arc::new(focus::FocusCommand),
            Arc::new(tokens::TokensCommand),
            Arc::new(quit::QuitCommand),
        ];
        Self { commands }
    }

    /// Dispatch input to a matching command, or return `NotACommand`.
    pub async fn dispatch(&self, input: &str, info: &SessionInfo<'_>) -> CommandResult {
        let input = input.trim();
        let (cmd, args) = input
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((input, ""));

        for command in &self.commands {
            if cmd == command.name() || command.aliases().contains(&cmd) {
                // /help is special: it needs the registry to list all commands
                if command.name() == "/help" {
                    print!("{}", self.help_text());
                    return CommandResult::Handled;
                }
                return command.execute(args, info).await;
            }
        }

        if cmd.starts_with('/') {
            println!("unknown command: {cmd}");
            println!("type /help for available commands");
            return CommandResult::Handled;
        }

        CommandResult::NotACommand
    }

    /// Generate help text from all registered commands.
    pub fn help_text(&self) -> String {
        let entries: Vec<(String, &str)> = self
            .commands
            .iter()
            .map(|c| (format_label(c.name(), c.aliases()), c.description()))
            .collect();

        let max_width = entries
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(10);

        let mut out = String::new();
        for (label, desc) in &entries {
            out.push_str(&format!("  {label:<max_width$}  {desc}\n"));
        }
        out.push_str(&format!(
            "  {:<max_width$}  run the pipeline on a page\n",
            "<url>"
        ));
        out
    }

    /// All registered command names.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// All registered names and aliases (for duplicate detection).
    pub fn all_triggers(&self) -> Vec<&str> {
        let mut triggers = Vec::new();
        for cmd in &self.commands {
            triggers.push(cmd.name());
            triggers.extend_from_slice(cmd.aliases());
        }
        triggers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn format_label(name: &str, aliases: &[&str]) -> String {
    if aliases.is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, aliases.join(", "))
    }
}
