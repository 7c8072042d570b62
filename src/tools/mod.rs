//! Offline tooling for maintaining a view catalog.

pub mod reference;

pub use reference::{collect_pixel_values, convert_references, save_document, snapshot};
