//! The `View` entity and its builder.
//!
//! A view is constructed once while loading the catalog and never mutated
//! afterwards. `ViewBuilder` accumulates fingerprint points and actions in
//! declaration order; `build()` freezes them.

use std::path::{Path, PathBuf};

use super::geometry::{ColorFingerprintPoint, Coordinate, TimedCoordinate};

/// Wait between consecutive injected actions when a view does not set `delay`.
pub const DEFAULT_ACTION_DELAY_MS: u64 = 100;

/// A recognizable screen state plus the inputs to replay when it is on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct View {
    name: String,
    reference_path: PathBuf,
    fingerprint: Box<[ColorFingerprintPoint]>,
    taps: Box<[Coordinate]>,
    long_taps: Box<[TimedCoordinate]>,
    action_delay_ms: u64,
}

impl View {
    pub fn builder(name: impl Into<String>, reference_path: impl Into<PathBuf>) -> ViewBuilder {
        ViewBuilder::new(name, reference_path)
    }

    /// Display label. Not an identity key: two views may share a name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw screen dump this view was fingerprinted from. Only used by offline tooling.
    pub fn reference_path(&self) -> &Path {
        &self.reference_path
    }

    pub fn fingerprint(&self) -> &[ColorFingerprintPoint] {
        &self.fingerprint
    }

    pub fn taps(&self) -> &[Coordinate] {
        &self.taps
    }

    pub fn long_taps(&self) -> &[TimedCoordinate] {
        &self.long_taps
    }

    pub fn action_delay_ms(&self) -> u64 {
        self.action_delay_ms
    }

    /// Total number of actions dispatched when this view matches.
    pub fn action_count(&self) -> usize {
        self.taps.len() + self.long_taps.len()
    }
}

/// Growable staging area for a `View`.
#[derive(Debug)]
pub struct ViewBuilder {
    name: String,
    reference_path: PathBuf,
    fingerprint: Vec<ColorFingerprintPoint>,
    taps: Vec<Coordinate>,
    long_taps: Vec<TimedCoordinate>,
    action_delay_ms: u64,
}

impl ViewBuilder {
    pub fn new(name: impl Into<String>, reference_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            reference_path: reference_path.into(),
            fingerprint: Vec::new(),
            taps: Vec::new(),
            long_taps: Vec::new(),
            action_delay_ms: DEFAULT_ACTION_DELAY_MS,
        }
    }

    pub fn search_pixel(mut self, point: ColorFingerprintPoint) -> Self {
        self.fingerprint.push(point);
        self
    }

    pub fn tap(mut self, position: Coordinate) -> Self {
        self.taps.push(position);
        self
    }

    pub fn long_tap(mut self, position: TimedCoordinate) -> Self {
        self.long_taps.push(position);
        self
    }

    pub fn action_delay_ms(mut self, delay_ms: u64) -> Self {
        self.action_delay_ms = delay_ms;
        self
    }

    pub fn build(self) -> View {
        View {
            name: self.name,
            reference_path: self.reference_path,
            fingerprint: self.fingerprint.into_boxed_slice(),
            taps: self.taps.into_boxed_slice(),
            long_taps: self.long_taps.into_boxed_slice(),
            action_delay_ms: self.action_delay_ms,
        }
    }
}
