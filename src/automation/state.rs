//! Dispatch loop state and backoff policy.
//!
//! The loop alternates between `Idle` (about to capture) and `Acting`
//! (replaying a matched view's inputs). There is no terminal state.

use std::time::Duration;

/// Consecutive failures per one-second backoff step.
pub const FAILURES_PER_STEP: u32 = 10;

/// Backoff added per step.
pub const BACKOFF_STEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchState {
    /// About to capture the screen
    Idle,
    /// Replaying the inputs of the named view
    Acting(String),
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchState::Idle => write!(f, "Idle"),
            DispatchState::Acting(name) => write!(f, "Acting: {}", name),
        }
    }
}

/// Result of one capture → match → act cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Matched(String),
    NoMatch,
    CaptureFailed,
}

/// Staircase backoff: `base + floor(failures / 10) * 1s`.
pub fn backoff_delay(base: Duration, failures: u32) -> Duration {
    base + BACKOFF_STEP * (failures / FAILURES_PER_STEP)
}

/// Blocking wait between steps. Swapped out in tests.
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

#[derive(Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(format!("{}", DispatchState::Idle), "Idle");
        assert_eq!(
            format!("{}", DispatchState::Acting("Login".to_string())),
            "Acting: Login"
        );
    }

    #[test]
    fn test_backoff_staircase() {
        let base = Duration::from_millis(400);
        assert_eq!(backoff_delay(base, 0), base);
        assert_eq!(backoff_delay(base, 9), base);
        assert_eq!(backoff_delay(base, 10), Duration::from_millis(1400));
        assert_eq!(backoff_delay(base, 19), Duration::from_millis(1400));
        assert_eq!(backoff_delay(base, 25), Duration::from_millis(2400));
    }

    #[test]
    fn test_backoff_is_non_decreasing() {
        let base = Duration::from_millis(100);
        let mut previous = Duration::ZERO;
        for failures in 0..100 {
            let wait = backoff_delay(base, failures);
            assert!(wait >= previous);
            assert_eq!(
                wait,
                base + Duration::from_millis(u64::from(failures / 10) * 1000)
            );
            previous = wait;
        }
    }
}
