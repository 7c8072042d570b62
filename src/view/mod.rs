//! View data model and catalog loading.
//!
//! This module provides:
//! - Screen-space value types (`Coordinate`, `TimedCoordinate`, `HexColor`)
//! - The immutable `View` and its builder
//! - `ViewCatalog`, the priority-ordered list of views loaded from JSON

pub mod catalog;
pub mod geometry;
pub mod model;

pub use catalog::{load_catalog, read_catalog_document, ViewCatalog};
pub use geometry::{ColorFingerprintPoint, Coordinate, HexColor, TimedCoordinate};
pub use model::{View, ViewBuilder};
