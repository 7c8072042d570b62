//! Screen capture decoding for the view matcher.
//!
//! This module provides:
//! - `ScreenSample`, a decoded RGBA grid built from a raw device capture
//! - Pixel sampling as canonical `#rrggbb` strings

pub mod screen;

pub use screen::{ScreenSample, BYTES_PER_PIXEL};
