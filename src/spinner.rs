//! A minimal terminal spinner for visual feedback while a run is in flight.

use std::io::Write;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::events::{Event, EventBus, Phase};

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame interval.
const INTERVAL: Duration = Duration::from_millis(80);

/// Spinner label for a phase, if the phase is worth showing.
pub fn label(phase: &Phase) -> Option<String> {
    match phase {
        Phase::Fetching { url } => Some(format!("fetching {url}")),
        Phase::Analyzing { step } => Some(format!("{step} is working")),
        Phase::Idle | Phase::Warned | Phase::Displaying => None,
    }
}

/// A terminal spinner that runs in a background task.
///
/// Call [`Spinner::follow`] to begin, then
/// [`Spinner::stop`] when done. The spinner writes to stderr so it doesn't
/// interfere with stdout output.
pub struct Spinner {
    handle: JoinHandle<()>,
    cancel: tokio::sync::watch::Sender<bool>,
}

impl Spinner {
    /// Start a spinner whose message tracks the phases published on `bus`.
    pub fn follow(message: &str, bus: &EventBus) -> Self {
        Self::spawn(message.to_string(), bus.subscribe())
    }

    fn spawn(mut message: String, mut events: broadcast::Receiver<Event>) -> Self {
        let (cancel_tx, mut cancel_rx) = tokio::sync::watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut i = 0;
            loop {
                let frame = FRAMES[i % FRAMES.len()];
                // \r moves to start of line, \x1b[2K clears the line
                eprint!("\x1b[2K\r{frame} {message}");
                let _ = std::io::stderr().flush();

                let next_event = async {
                    loop {
                        match events.recv().await {
                            Ok(event) => break event,
                            Err(broadcast::error::RecvError::Lagged(_)) => continue,
                            Err(broadcast::error::RecvError::Closed) => {
                                std::future::pending::<()>().await;
                            }
                        }
                    }
                };

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => { i += 1; }
                    _ = cancel_rx.changed() => break,
                    event = next_event => match event {
                        Event::Phase(phase) => {
                            if let Some(text) = label(&phase) {
                                message = text;
                            }
                        }
                        Event::StepFailed { step, .. } => {
                            eprintln!("\x1b[2K\r  ✗ {step} failed");
                        }
                    },
                }
            }
            // Clear the spinner line
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self {
            handle,
            cancel: cancel_tx,
        }
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_single_braille_chars() {
        assert!(!FRAMES.is_empty());
        for frame in FRAMES {
            assert_eq!(frame.chars().count(), 1);
        }
    }

    #[test]
    fn labels_for_busy_phases_only() {
        assert_eq!(
            label(&Phase::Analyzing {
                step: "Macro Analyst".into()
            })
            .as_deref(),
            Some("Macro Analyst is working")
        );
        assert!(label(&Phase::Fetching { url: "http://x".into() }).is_some());
        assert!(label(&Phase::Idle).is_none());
        assert!(label(&Phase::Displaying).is_none());
    }

    #[tokio::test]
    async fn spinner_starts_and_stops_without_panic() {
        let bus = EventBus::default();
        let spinner = Spinner::follow("testing", &bus);
        tokio::time::sleep(Duration::from_millis(200)).await;
        spinner.stop().await;
    }

    #[tokio::test]
    async fn spinner_stops_after_bus_is_dropped() {
        let bus = EventBus::default();
        let spinner = Spinner::follow("testing", &bus);
        drop(bus);
        tokio::time::sleep(Duration::from_millis(100)).await;
        spinner.stop().await;
    }

    #[tokio::test]
    async fn following_spinner_survives_events() {
        let bus = EventBus::default();
        let spinner = Spinner::follow("starting", &bus);
        bus.phase(Phase::Fetching {
            url: "http://example.com".into(),
        });
        bus.emit(Event::StepFailed {
            step: "Risk Evaluator".into(),
            error: "boom".into(),
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        spinner.stop().await;
    }
}
