//! Structured events emitted by the dispatch loop.
//!
//! The loop never prints. It reports what happens to an `EventSink`; `LogSink`
//! renders events through the `log` facade.

use std::time::Duration;

use crate::automation::state::DispatchState;
use crate::view::{Coordinate, TimedCoordinate};

/// An injected input, as reported in events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Tap(Coordinate),
    LongTap(TimedCoordinate),
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Tap(at) => write!(f, "tap {}", at),
            Action::LongTap(at) => write!(f, "long tap {}", at),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DispatchEvent {
    CycleStarted { cycle: u64 },
    CaptureFailed { error: String },
    ReconnectFailed { error: String },
    ViewMatched { name: String, actions: usize },
    StateChanged { state: DispatchState },
    NoMatch { failures: u32, wait: Duration },
    ActionExecuted { action: Action },
    ActionFailed { action: Action, error: String },
}

pub trait EventSink {
    fn emit(&mut self, event: DispatchEvent);
}

/// Production sink: one log line per event.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: DispatchEvent) {
        match event {
            DispatchEvent::CycleStarted { cycle } => log::debug!("Cycle {}: capturing screen", cycle),
            DispatchEvent::CaptureFailed { error } => log::error!("Error capturing screen: {}", error),
            DispatchEvent::ReconnectFailed { error } => log::warn!("Reconnect failed: {}", error),
            DispatchEvent::ViewMatched { name, actions } => {
                log::info!("View: {} OK ({} action(s))", name, actions)
            }
            DispatchEvent::StateChanged { state } => log::debug!("State: {}", state),
            DispatchEvent::NoMatch { failures, wait } => log::info!(
                "No view found ({} in a row), waiting {}ms",
                failures,
                wait.as_millis()
            ),
            DispatchEvent::ActionExecuted { action } => log::debug!("Sent {}", action),
            DispatchEvent::ActionFailed { action, error } => {
                log::warn!("Failed to send {}: {}", action, error)
            }
        }
    }
}

/// Sink that keeps every event.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<DispatchEvent>,
}

#[cfg(test)]
impl EventSink for RecordingSink {
    fn emit(&mut self, event: DispatchEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Tap(Coordinate::new(1, 2)).to_string(), "tap (1, 2)");
        assert_eq!(
            Action::LongTap(TimedCoordinate::new(3, 3, 500)).to_string(),
            "long tap (3, 3) for 500ms"
        );
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::default();
        sink.emit(DispatchEvent::CycleStarted { cycle: 1 });
        sink.emit(DispatchEvent::CaptureFailed {
            error: "offline".to_string(),
        });
        assert_eq!(
            sink.events,
            vec![
                DispatchEvent::CycleStarted { cycle: 1 },
                DispatchEvent::CaptureFailed {
                    error: "offline".to_string()
                },
            ]
        );
    }
}
