//! View recognition by exact pixel-color sampling.
//!
//! A view is on screen when every one of its fingerprint pixels has exactly
//! the expected color. The catalog is searched in order and the first view
//! that matches wins.

use crate::capture::ScreenSample;
use crate::error::FingerprintError;
use crate::view::{View, ViewCatalog};

/// Checks every fingerprint point of `view`, stopping at the first mismatch.
///
/// A view without fingerprint points is present on any screen.
pub fn is_view_present(view: &View, screen: &ScreenSample) -> Result<bool, FingerprintError> {
    for point in view.fingerprint() {
        if screen.sample(point.position)? != point.color {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Returns the first view in catalog order that is present on `screen`.
///
/// Out-of-bounds fingerprint points are returned as errors, never as "no match".
pub fn find_match<'a>(
    screen: &ScreenSample,
    catalog: &'a ViewCatalog,
) -> Result<Option<&'a View>, FingerprintError> {
    for view in catalog {
        log::debug!("Checking view: {}", view.name());
        if is_view_present(view, screen)? {
            return Ok(Some(view));
        }
    }
    Ok(None)
}
