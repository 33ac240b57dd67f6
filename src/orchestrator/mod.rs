//! Runs a registry's steps for one submitted URL.
//!
//! Two modes share one entry point, [`Orchestrator::run`]:
//! with no selection every step runs once in registration order; with a
//! selection only that step runs. Either way the page is fetched first and
//! the result is handed back for the caller to persist.

pub mod result;

use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{info, warn};

pub use result::{RunResult, StepFailure, StepOutput, is_investment_step};

use crate::completer::{Completer, TokenUsage};
use crate::config::Settings;
use crate::events::{Event, EventBus, Phase};
use crate::fetcher::{Fetcher, is_scrape_error};
use crate::pipeline::{Capabilities, Registry};

pub struct Orchestrator {
    registry: Registry,
    completer: Arc<dyn Completer>,
    fetcher: Arc<dyn Fetcher>,
    chain_outputs: bool,
    events: EventBus,
    session_usage: TokenUsage,
}

impl Orchestrator {
    pub fn new(
        registry: Registry,
        completer: Arc<dyn Completer>,
        fetcher: Arc<dyn Fetcher>,
        settings: &Settings,
    ) -> Self {
        Self {
            registry,
            completer,
            fetcher,
            chain_outputs: settings.chain_outputs,
            events: EventBus::default(),
            session_usage: TokenUsage::default(),
        }
    }

    /// Report progress on `bus` instead of a private one.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = bus;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Tokens used by every run so far.
    pub fn session_usage(&self) -> TokenUsage {
        self.session_usage
    }

    /// Fetch `url`, then run either every step or just `selected`.
    ///
    /// A step whose capability fails is recorded in
    /// [`RunResult::failures`] and the remaining steps still run. Only an
    /// unknown `selected` name fails the whole run, before anything is fetched.
    pub async fn run(&mut self, url: &str, selected: Option<&str>) -> Result<RunResult> {
        let steps: Vec<String> = match selected {
            Some(name) => {
                if self.registry.get(name).is_none() {
                    bail!("unknown step: {name}");
                }
                vec![name.to_string()]
            }
            None => self.registry.names().into_iter().map(String::from).collect(),
        };

        self.events.phase(Phase::Fetching {
            url: url.to_string(),
        });
        let content = self.fetcher.fetch(url).await;
        if is_scrape_error(&content) {
            warn!(%url, "continuing with scrape error as content");
        }

        let caps = Capabilities {
            completer: self.completer.as_ref(),
            fetcher: self.fetcher.as_ref(),
        };

        let mut usage = TokenUsage::default();
        let mut outputs = Vec::with_capacity(steps.len());
        let mut failures = Vec::new();
        let mut input = content.clone();

        for step in steps {
            self.events.phase(Phase::Analyzing { step: step.clone() });
            info!(%step, "running step");

            match self.registry.invoke(&step, &input, caps).await {
                Ok(invocation) => {
                    if let Some(u) = invocation.usage {
                        usage.add(u);
                    }
                    if self.chain_outputs {
                        input = invocation.text.clone();
                    }
                    outputs.push(StepOutput {
                        step,
                        text: invocation.text,
                    });
                }
                Err(e) => {
                    warn!(%step, error = %e, "step failed");
                    self.events.emit(Event::StepFailed {
                        step: step.clone(),
                        error: e.to_string(),
                    });
                    failures.push(StepFailure {
                        step,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.session_usage.add(usage);

        Ok(RunResult {
            url: url.to_string(),
            selected: selected.map(str::to_string),
            content,
            outputs,
            failures,
            usage,
        })
    }
}
