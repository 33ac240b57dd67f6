//! The interactive surface: a submit trigger that runs the pipeline and
//! stores its result, and a show trigger that dumps the store.
//!
//! One interaction walks `Idle → Fetching → Analyzing → Displaying → Idle`
//! (or `Idle → Warned → Idle` on blank input, `Idle → Displaying → Idle`
//! for show). A run or store error drops straight back to `Idle`.
//! Each transition is published on the orchestrator's
//! [`EventBus`](crate::events::EventBus).

pub mod render;

use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tracing::info;

use crate::completer::TokenUsage;
use crate::events::{EventBus, Phase};
use crate::orchestrator::{Orchestrator, RunResult, is_investment_step};
use crate::store::{Store, StoredEntry};

/// How submissions pick steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every step runs on every submission.
    Sequence,
    /// Only the current focus runs.
    Select,
}

/// What a submit produced.
#[derive(Debug)]
pub enum Submission {
    /// Nothing was run; the message says why.
    Warned(String),
    /// The run finished. `id` is `None` when every step failed and there
    /// was nothing to store.
    Completed { run: RunResult, id: Option<i64> },
}

pub struct Dashboard {
    orchestrator: Orchestrator,
    store: Arc<dyn Store>,
    mode: Mode,
    focus: Option<String>,
}

impl Dashboard {
    /// Fails when a sequence pipeline has a step whose output would have
    /// nowhere to go in the stored record.
    pub fn new(orchestrator: Orchestrator, store: Arc<dyn Store>, mode: Mode) -> Result<Self> {
        if mode == Mode::Sequence {
            let registry = orchestrator.registry();
            if registry.is_empty() {
                bail!("sequence pipeline has no steps");
            }
            if let Some(step) = registry.names().into_iter().find(|s| !is_investment_step(s)) {
                bail!("step {step} does not fill any investment field");
            }
        }
        Ok(Self {
            orchestrator,
            store,
            mode,
            focus: None,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Step names the user can submit against or focus on.
    pub fn steps(&self) -> Vec<&str> {
        self.orchestrator.registry().names()
    }

    /// Where phase transitions are published.
    pub fn events(&self) -> &EventBus {
        self.orchestrator.events()
    }

    pub fn session_usage(&self) -> TokenUsage {
        self.orchestrator.session_usage()
    }

    /// Pick the step that select mode runs.
    pub fn set_focus(&mut self, name: &str) -> Result<()> {
        if self.mode == Mode::Sequence {
            bail!("this pipeline runs every step; there is nothing to focus on");
        }
        if self.orchestrator.registry().get(name).is_none() {
            bail!("unknown focus: {name}");
        }
        self.focus = Some(name.to_string());
        Ok(())
    }

    /// Run the pipeline on `input` and store what it produced.
    pub async fn submit(&mut self, input: &str) -> Result<Submission> {
        let events = self.orchestrator.events().clone();
        let url = input.trim();

        let warning = if url.is_empty() {
            Some("please enter a URL".to_string())
        } else if self.mode == Mode::Select && self.focus.is_none() {
            Some("no focus selected, pick one with /focus".to_string())
        } else {
            None
        };
        if let Some(message) = warning {
            events.phase(Phase::Warned);
            events.phase(Phase::Idle);
            return Ok(Submission::Warned(message));
        }

        let selected = match self.mode {
            Mode::Sequence => None,
            Mode::Select => self.focus.clone(),
        };

        let outcome = self.run_and_store(url, selected.as_deref()).await;
        if outcome.is_ok() {
            events.phase(Phase::Displaying);
        }
        events.phase(Phase::Idle);
        let (run, id) = outcome?;
        Ok(Submission::Completed { run, id })
    }

    async fn run_and_store(
        &mut self,
        url: &str,
        selected: Option<&str>,
    ) -> Result<(RunResult, Option<i64>)> {
        let run = self.orchestrator.run(url, selected).await?;

        let id = match run.to_record() {
            Some(record) => {
                let id = self
                    .store
                    .insert(record)
                    .await
                    .context("failed to store run result")?;
                info!(id, %url, "run stored");
                Some(id)
            }
            None => None,
        };
        Ok((run, id))
    }

    /// Every stored record, oldest first.
    pub async fn show(&self) -> Result<Vec<StoredEntry>> {
        let events = self.orchestrator.events();
        let entries = self.store.all().await?;
        events.phase(Phase::Displaying);
        events.phase(Phase::Idle);
        Ok(entries)
    }

    pub async fn find(&self, query: &str) -> Result<Vec<StoredEntry>> {
        self.store.search(query).await
    }
}
