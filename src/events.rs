//! Decoupled event bus for progress reporting.
//!
//! The orchestrator and dashboard emit [`Phase`] transitions via
//! [`EventBus::emit`]; the terminal front end subscribes via
//! [`EventBus::subscribe`] to show what a run is doing. Built on
//! [`tokio::sync::broadcast`] so multiple listeners can react independently.

use tokio::sync::broadcast;

/// Where a single dashboard interaction currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Submit was pressed with nothing to run.
    Warned,
    Fetching { url: String },
    Analyzing { step: String },
    Displaying,
}

/// Events that flow through the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Phase(Phase),
    /// A step's capability failed; the run continues without it.
    StepFailed { step: String, error: String },
}

/// A broadcast channel that any component can emit to or subscribe from.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all current subscribers.
    /// Returns the number of receivers that will see it.
    pub fn emit(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn phase(&self, phase: Phase) -> usize {
        self.emit(Event::Phase(phase))
    }

    /// Subscribe to events. Returns a receiver that yields all
    /// future events (does not replay past ones).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
