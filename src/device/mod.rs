//! Device transport: capturing the screen and injecting input.
//!
//! The dispatch loop only sees the `Device` trait. `AdbDevice` is the
//! production implementation; tests substitute recording fakes.

pub mod adb;
pub mod dumpsys;

pub use adb::AdbDevice;

use crate::error::{ActionInjectionError, CaptureError, DeviceError};
use crate::view::{Coordinate, TimedCoordinate};

/// Display rotation reported by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceOrientation {
    Portrait,
    Landscape,
    PortraitReversed,
    LandscapeReversed,
}

impl DeviceOrientation {
    /// Maps an Android surface rotation (0..=3, quarter turns) to an orientation.
    pub fn from_rotation(rotation: u32) -> Option<Self> {
        match rotation {
            0 => Some(Self::Portrait),
            1 => Some(Self::Landscape),
            2 => Some(Self::PortraitReversed),
            3 => Some(Self::LandscapeReversed),
            _ => None,
        }
    }

    pub fn is_landscape(self) -> bool {
        matches!(self, Self::Landscape | Self::LandscapeReversed)
    }

    /// Normalizes a `(width, height)` pair to this orientation: long side first
    /// in landscape, short side first in portrait.
    pub fn oriented_size(self, (width, height): (u32, u32)) -> (u32, u32) {
        let (long, short) = (width.max(height), width.min(height));
        if self.is_landscape() {
            (long, short)
        } else {
            (short, long)
        }
    }
}

impl std::fmt::Display for DeviceOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceOrientation::Portrait => write!(f, "portrait"),
            DeviceOrientation::Landscape => write!(f, "landscape"),
            DeviceOrientation::PortraitReversed => write!(f, "portrait (reversed)"),
            DeviceOrientation::LandscapeReversed => write!(f, "landscape (reversed)"),
        }
    }
}

/// Capabilities the dispatch loop needs from a device. All calls block.
pub trait Device {
    /// Returns a raw RGBA buffer of at least `width * height * 4` bytes.
    fn capture_screen(&self, width: u32, height: u32) -> Result<Vec<u8>, CaptureError>;

    fn tap(&self, at: Coordinate) -> Result<(), ActionInjectionError>;

    /// Long press: a swipe whose start and end are the same point.
    fn long_tap(&self, at: TimedCoordinate) -> Result<(), ActionInjectionError>;

    /// Best-effort re-establishment of the transport.
    fn reconnect(&self) -> Result<(), DeviceError>;

    fn orientation(&self) -> Result<DeviceOrientation, DeviceError>;

    fn physical_size(&self) -> Result<(u32, u32), DeviceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oriented_size() {
        assert_eq!(
            DeviceOrientation::Landscape.oriented_size((1080, 1920)),
            (1920, 1080)
        );
        assert_eq!(
            DeviceOrientation::LandscapeReversed.oriented_size((1920, 1080)),
            (1920, 1080)
        );
        assert_eq!(
            DeviceOrientation::Portrait.oriented_size((1920, 1080)),
            (1080, 1920)
        );
        assert_eq!(
            DeviceOrientation::PortraitReversed.oriented_size((1080, 1920)),
            (1080, 1920)
        );
    }

    #[test]
    fn test_from_rotation() {
        assert_eq!(
            DeviceOrientation::from_rotation(3),
            Some(DeviceOrientation::LandscapeReversed)
        );
        assert_eq!(DeviceOrientation::from_rotation(4), None);
    }
}
