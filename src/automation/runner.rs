//! Dispatch loop - the capture → match → act → backoff cycle.
//!
//! Runs on the calling thread and never polls the device concurrently.
//! Capture and injection failures are absorbed into backoff; a fingerprint
//! point outside the screen stops the loop.

use std::time::Duration;

use crate::automation::config::BotConfig;
use crate::automation::detection::find_match;
use crate::automation::events::{Action, DispatchEvent, EventSink};
use crate::automation::state::{backoff_delay, CycleOutcome, DispatchState, Pacer};
use crate::capture::ScreenSample;
use crate::device::Device;
use crate::error::{CaptureError, FingerprintError};
use crate::view::{View, ViewCatalog};

/// Drives a device from a view catalog.
pub struct Dispatcher<D, P, S> {
    device: D,
    catalog: ViewCatalog,
    pacer: P,
    sink: S,
    base_interval: Duration,
    screen_size: (u32, u32),
    detect_orientation: bool,
    /// Size derived from the last orientation query. Cleared after a failed capture.
    oriented_size: Option<(u32, u32)>,
    state: DispatchState,
    /// Consecutive unmatched or failed cycles
    failures: u32,
    cycle: u64,
}

impl<D: Device, P: Pacer, S: EventSink> Dispatcher<D, P, S> {
    pub fn new(device: D, catalog: ViewCatalog, config: &BotConfig, pacer: P, sink: S) -> Self {
        Self {
            device,
            catalog,
            pacer,
            sink,
            base_interval: Duration::from_millis(config.base_interval_ms),
            screen_size: config.screen_size(),
            detect_orientation: config.detect_orientation,
            oriented_size: None,
            state: DispatchState::Idle,
            failures: 0,
            cycle: 0,
        }
    }

    /// Polls forever. Returns only when a fingerprint point is out of bounds.
    pub fn run(&mut self) -> Result<(), FingerprintError> {
        log::info!(
            "Starting dispatch loop: {} view(s), base interval {}ms",
            self.catalog.len(),
            self.base_interval.as_millis()
        );
        loop {
            self.step()?;
        }
    }

    /// Runs one cycle.
    pub fn step(&mut self) -> Result<CycleOutcome, FingerprintError> {
        self.cycle += 1;
        self.sink.emit(DispatchEvent::CycleStarted { cycle: self.cycle });

        let screen = match self.capture() {
            Ok(screen) => screen,
            Err(e) => {
                self.sink.emit(DispatchEvent::CaptureFailed {
                    error: e.to_string(),
                });
                // The device may have rotated or been swapped; ask again next cycle.
                self.oriented_size = None;
                if let Err(e) = self.device.reconnect() {
                    self.sink.emit(DispatchEvent::ReconnectFailed {
                        error: e.to_string(),
                    });
                }
                self.back_off();
                return Ok(CycleOutcome::CaptureFailed);
            }
        };

        let Some(view) = find_match(&screen, &self.catalog)? else {
            self.back_off();
            return Ok(CycleOutcome::NoMatch);
        };

        let name = view.name().to_string();
        self.sink.emit(DispatchEvent::ViewMatched {
            name: name.clone(),
            actions: view.action_count(),
        });
        transition(&mut self.state, &mut self.sink, DispatchState::Acting(name.clone()));
        dispatch_actions(&self.device, &mut self.pacer, &mut self.sink, view);
        transition(&mut self.state, &mut self.sink, DispatchState::Idle);

        self.failures = 0;
        Ok(CycleOutcome::Matched(name))
    }

    fn capture(&mut self) -> Result<ScreenSample, CaptureError> {
        let (width, height) = self.capture_size();
        let bytes = self.device.capture_screen(width, height)?;
        ScreenSample::from_raw(width, height, bytes)
    }

    /// Configured screen size, turned to match the device when detection is on.
    ///
    /// The orientation is queried once and reused until a capture fails.
    fn capture_size(&mut self) -> (u32, u32) {
        if !self.detect_orientation {
            return self.screen_size;
        }
        if let Some(size) = self.oriented_size {
            return size;
        }
        let size = match self.device.orientation() {
            Ok(orientation) => orientation.oriented_size(self.screen_size),
            Err(e) => {
                log::debug!("Orientation unavailable, using configured size: {}", e);
                self.screen_size
            }
        };
        self.oriented_size = Some(size);
        size
    }

    fn back_off(&mut self) {
        self.failures = self.failures.saturating_add(1);
        let wait = backoff_delay(self.base_interval, self.failures);
        self.sink.emit(DispatchEvent::NoMatch {
            failures: self.failures,
            wait,
        });
        self.pacer.pause(wait);
    }
}

fn transition<S: EventSink>(current: &mut DispatchState, sink: &mut S, next: DispatchState) {
    if *current != next {
        *current = next.clone();
        sink.emit(DispatchEvent::StateChanged { state: next });
    }
}

/// Replays taps, then long taps, each followed by the view's delay.
///
/// A failed injection is reported and skipped; the rest of the sequence still runs.
fn dispatch_actions<D: Device, P: Pacer, S: EventSink>(
    device: &D,
    pacer: &mut P,
    sink: &mut S,
    view: &View,
) {
    let delay = Duration::from_millis(view.action_delay_ms());
    let taps = view.taps().iter().map(|&at| Action::Tap(at));
    let long_taps = view.long_taps().iter().map(|&at| Action::LongTap(at));

    for action in taps.chain(long_taps) {
        let result = match action {
            Action::Tap(at) => device.tap(at),
            Action::LongTap(at) => device.long_tap(at),
        };
        match result {
            Ok(()) => sink.emit(DispatchEvent::ActionExecuted { action }),
            Err(e) => sink.emit(DispatchEvent::ActionFailed {
                action,
                error: e.to_string(),
            }),
        }
        pacer.pause(delay);
    }
}
