//! Parser for Android diagnostic output (`dumpsys input`, `dumpsys window`, `wm size`).
//!
//! Grammar, applied line by line:
//! - A line of the form `<key>: <value>` where neither side contains `=` is one
//!   pair. The key may contain spaces (`Physical size: 1080x1920`).
//! - Otherwise the line is split on whitespace and every token of the form
//!   `<key>=<value>` is a pair (`mCurrentRotation=ROTATION_90 mLastOrientation=0`).
//!   A trailing `,` on the value is dropped (`displayId=0, orientation=1,`).
//!
//! Keys and values are trimmed. Later pairs override earlier ones with the same key.

use std::collections::HashMap;

use super::DeviceOrientation;

/// Tokenizes diagnostic text into key/value pairs.
pub fn parse_pairs(text: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((key, value)) = line.split_once(": ") {
            if !key.contains('=') && !value.contains('=') {
                pairs.insert(key.trim().to_string(), value.trim().to_string());
                continue;
            }
        }

        for token in line.split_whitespace() {
            if let Some((key, value)) = token.split_once('=') {
                if !key.is_empty() {
                    pairs.insert(key.to_string(), value.trim_end_matches(',').to_string());
                }
            }
        }
    }
    pairs
}

/// Extracts the display orientation.
///
/// Accepts `SurfaceOrientation: N` (from `dumpsys input`) or
/// `mCurrentRotation=ROTATION_<deg>` / `mCurrentRotation=N` (from `dumpsys window`).
pub fn parse_orientation(text: &str) -> Option<DeviceOrientation> {
    let pairs = parse_pairs(text);

    if let Some(value) = pairs.get("SurfaceOrientation") {
        return value.parse().ok().and_then(DeviceOrientation::from_rotation);
    }

    let value = pairs.get("mCurrentRotation")?;
    let rotation = match value.strip_prefix("ROTATION_") {
        Some(degrees) => degrees.parse::<u32>().ok()? / 90,
        None => value.parse().ok()?,
    };
    DeviceOrientation::from_rotation(rotation)
}

/// Extracts the screen size from `wm size`. An override size wins over the physical one.
pub fn parse_screen_size(text: &str) -> Option<(u32, u32)> {
    let pairs = parse_pairs(text);
    let value = pairs
        .get("Override size")
        .or_else(|| pairs.get("Physical size"))?;
    parse_dimensions(value)
}

/// Parses `<width>x<height>`.
pub fn parse_dimensions(value: &str) -> Option<(u32, u32)> {
    let (width, height) = value.trim().split_once('x')?;
    Some((width.parse().ok()?, height.parse().ok()?))
}
