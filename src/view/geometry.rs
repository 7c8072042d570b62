//! Screen-space value types shared by views, the sampler and the device layer.

use std::fmt;

/// A pixel position on the device screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A position held for `duration_ms`. Injected as a zero-length swipe (long press).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimedCoordinate {
    pub x: u32,
    pub y: u32,
    pub duration_ms: u64,
}

impl TimedCoordinate {
    pub const fn new(x: u32, y: u32, duration_ms: u64) -> Self {
        Self { x, y, duration_ms }
    }
}

impl fmt::Display for TimedCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) for {}ms", self.x, self.y, self.duration_ms)
    }
}

/// Canonical `#rrggbb` color, always lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HexColor(String);

impl HexColor {
    /// Formats an 8-bit-per-channel sample. Alpha, if any, is ignored by the caller.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", r, g, b))
    }

    /// Parses `#rrggbb` (either case). Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('#')?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(format!("#{}", digits.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One identifying pixel of a view: where to look and what color to expect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorFingerprintPoint {
    pub position: Coordinate,
    pub color: HexColor,
}

impl ColorFingerprintPoint {
    pub fn new(position: Coordinate, color: HexColor) -> Self {
        Self { position, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_pads_and_lowercases() {
        assert_eq!(HexColor::from_rgb(255, 0, 10).as_str(), "#ff000a");
        assert_eq!(HexColor::from_rgb(0, 0, 0).as_str(), "#000000");
    }

    #[test]
    fn test_parse_normalizes_case() {
        let color = HexColor::parse("#FFaa00").unwrap();
        assert_eq!(color.as_str(), "#ffaa00");
        assert_eq!(color, HexColor::from_rgb(255, 170, 0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(HexColor::parse("ff0000").is_none());
        assert!(HexColor::parse("#ff00").is_none());
        assert!(HexColor::parse("#ff00000").is_none());
        assert!(HexColor::parse("#gg0000").is_none());
        assert!(HexColor::parse("").is_none());
    }

    #[test]
    fn test_timed_coordinate_display() {
        let timed = TimedCoordinate::new(3, 4, 500);
        assert_eq!(timed.to_string(), "(3, 4) for 500ms");
    }
}
