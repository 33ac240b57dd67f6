//! Named pipeline steps and the ordered registry that holds them.
//!
//! A step is configuration, not code: a name, a role, an instruction, the
//! template that turns those plus the input into a prompt, and the
//! [`Capability`] it dispatches to. The [`Registry`] keeps steps in
//! registration order and owns nothing else.

pub mod presets;

use anyhow::{Result, anyhow, bail};

use crate::completer::{Completer, TokenUsage};
use crate::fetcher::Fetcher;

/// What a step does when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Render the template and ask the model.
    Completion,
    /// Treat the input as a URL and scrape it.
    Fetch,
}

/// One named unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStep {
    pub name: String,
    pub role: String,
    pub instruction: String,
    /// Prompt template with `{name}`, `{role}`, `{instruction}` and `{input}` placeholders.
    pub template: String,
    pub capability: Capability,
}

impl PipelineStep {
    pub fn completion(name: &str, role: &str, instruction: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            role: role.to_string(),
            instruction: instruction.to_string(),
            template: template.to_string(),
            capability: Capability::Completion,
        }
    }

    pub fn fetch(name: &str, role: &str) -> Self {
        Self {
            name: name.to_string(),
            role: role.to_string(),
            instruction: String::new(),
            template: "{input}".to_string(),
            capability: Capability::Fetch,
        }
    }

    /// Fill the template. `{input}` is substituted last so placeholders
    /// that happen to appear in page content are left alone.
    pub fn render(&self, input: &str) -> String {
        self.template
            .replace("{name}", &self.name)
            .replace("{role}", &self.role)
            .replace("{instruction}", &self.instruction)
            .replace("{input}", input)
    }
}

/// The external actions a step may dispatch to.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub completer: &'a dyn Completer,
    pub fetcher: &'a dyn Fetcher,
}

/// Output of one step invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// Steps in registration order, names unique.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    steps: Vec<PipelineStep>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Fails if the name is already taken.
    pub fn register(&mut self, step: PipelineStep) -> Result<()> {
        if self.get(&step.name).is_some() {
            bail!("step already registered: {}", step.name);
        }
        self.steps.push(step);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PipelineStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Step names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipelineStep> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run the named step on `input` with its bound capability.
    pub async fn invoke(
        &self,
        name: &str,
        input: &str,
        caps: Capabilities<'_>,
    ) -> Result<Invocation> {
        let step = self
            .get(name)
            .ok_or_else(|| anyhow!("unknown step: {name}"))?;

        match step.capability {
            Capability::Completion => {
                let completion = caps.completer.complete(&step.render(input)).await?;
                Ok(Invocation {
                    text: completion.text,
                    usage: completion.usage,
                })
            }
            Capability::Fetch => Ok(Invocation {
                text: caps.fetcher.fetch(input.trim()).await,
                usage: None,
            }),
        }
    }
}
