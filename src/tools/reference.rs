//! Reference dump tooling.
//!
//! Each view's `reference` points at a raw RGBA screen dump taken while the
//! view was on screen. These helpers capture new dumps, turn dumps into PNGs
//! for inspection, and refresh the expected fingerprint colors from the dumps.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::ScreenSample;
use crate::device::Device;
use crate::view::catalog::{NAME_KEY, REFERENCE_KEY, SEARCH_PIXELS_KEY, VIEWS_KEY};
use crate::view::{Coordinate, HexColor};

/// Captures the current screen and writes it as a raw dump to `path`.
pub fn snapshot(device: &impl Device, (width, height): (u32, u32), path: &Path) -> Result<()> {
    let bytes = device
        .capture_screen(width, height)
        .context("Failed to capture screen")?;
    let screen = ScreenSample::from_raw(width, height, bytes)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, screen.image().as_raw())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Screen dump ({}x{}) saved to {}", width, height, path.display());
    Ok(())
}

/// Saves a PNG next to every view's reference dump. Returns the written paths.
pub fn convert_references(
    document: &Value,
    base_dir: &Path,
    (width, height): (u32, u32),
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (view_id, view) in views(document)? {
        let dump = reference_path(view_id, view, base_dir)?;
        log::info!("File {}", display_name(view_id, view));

        let screen = ScreenSample::from_dump(&dump, width, height)?;
        let png = dump.with_extension("png");
        screen
            .image()
            .save(&png)
            .with_context(|| format!("Failed to save {}", png.display()))?;
        written.push(png);
    }
    Ok(written)
}

/// Re-samples every search pixel from its view's reference dump and writes
/// the sampled colors back into `document`. Returns how many colors changed.
pub fn collect_pixel_values(
    document: &mut Value,
    base_dir: &Path,
    (width, height): (u32, u32),
) -> Result<usize> {
    let mut changed = 0;
    let views = document
        .get_mut(VIEWS_KEY)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| anyhow!("missing '{}' object", VIEWS_KEY))?;

    for (view_id, view) in views.iter_mut() {
        let dump = reference_path(view_id, view, base_dir)?;
        log::info!("File {}", display_name(view_id, view));
        let screen = ScreenSample::from_dump(&dump, width, height)?;

        let pixels = view
            .get_mut(SEARCH_PIXELS_KEY)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| anyhow!("view '{}': missing '{}'", view_id, SEARCH_PIXELS_KEY))?;

        for pixel in pixels.values_mut() {
            let (at, expected) = parse_pixel(view_id, pixel)?;
            let found = screen
                .sample(at)
                .with_context(|| format!("view '{}'", view_id))?;

            if expected.as_deref() != Some(found.as_str()) {
                log::warn!(
                    "For pixel ({}, {}) found {} expected {}",
                    at.x,
                    at.y,
                    found,
                    expected.as_deref().unwrap_or("<invalid>")
                );
                pixel[2] = Value::String(found.to_string());
                changed += 1;
            }
        }
        log::info!("OK");
    }
    Ok(changed)
}

/// Writes a catalog document back to disk, keeping key order.
pub fn save_document(document: &Value, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Catalog saved to {}", path.display());
    Ok(())
}

fn views(document: &Value) -> Result<impl Iterator<Item = (&String, &Value)>> {
    Ok(document
        .get(VIEWS_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| anyhow!("missing '{}' object", VIEWS_KEY))?
        .iter())
}

fn reference_path(view_id: &str, view: &Value, base_dir: &Path) -> Result<PathBuf> {
    let reference = view
        .get(REFERENCE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("view '{}': missing '{}'", view_id, REFERENCE_KEY))?;
    Ok(base_dir.join(reference))
}

fn display_name<'a>(view_id: &'a str, view: &'a Value) -> &'a str {
    view.get(NAME_KEY).and_then(Value::as_str).unwrap_or(view_id)
}

/// Returns the pixel position and its expected color (normalized, if valid).
fn parse_pixel(view_id: &str, pixel: &Value) -> Result<(Coordinate, Option<String>)> {
    let invalid = || anyhow!("view '{}': invalid search pixel {}", view_id, pixel);
    let items = pixel
        .as_array()
        .filter(|items| items.len() == 3)
        .ok_or_else(invalid)?;
    let (Some(x), Some(y)) = (items[0].as_u64(), items[1].as_u64()) else {
        return Err(invalid());
    };
    let at = Coordinate::new(u32::try_from(x)?, u32::try_from(y)?);
    let expected = items[2]
        .as_str()
        .and_then(HexColor::parse)
        .map(|color| color.to_string());
    Ok((at, expected))
}
