//! View catalog loading.
//!
//! The catalog document looks like:
//!
//! ```json
//! { "views": {
//!     "login": {
//!       "name": "Login",
//!       "reference": "dumps/login.dump",
//!       "searchPixels": { "p1": [10, 20, "#ff0000"] },
//!       "touches":      { "t1": [100, 200] },
//!       "longtouches":  { "l1": [300, 400, 800] },
//!       "delay": 150
//! } } }
//! ```
//!
//! Keys inside the inner mappings carry no meaning, but their order does:
//! views are matched in document order and actions are replayed in document order.

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use super::geometry::{ColorFingerprintPoint, Coordinate, HexColor, TimedCoordinate};
use super::model::{View, ViewBuilder};
use crate::error::ConfigError;

pub const VIEWS_KEY: &str = "views";
pub const NAME_KEY: &str = "name";
pub const REFERENCE_KEY: &str = "reference";
pub const SEARCH_PIXELS_KEY: &str = "searchPixels";
pub const TOUCHES_KEY: &str = "touches";
pub const LONG_TOUCHES_KEY: &str = "longtouches";
pub const DELAY_KEY: &str = "delay";

/// Ordered, immutable list of views. Earlier views win when several match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewCatalog {
    views: Box<[View]>,
}

impl ViewCatalog {
    pub fn new(views: Vec<View>) -> Self {
        Self {
            views: views.into_boxed_slice(),
        }
    }

    /// Builds the catalog from an already-parsed document.
    pub fn from_value(document: &Value) -> Result<Self, ConfigError> {
        let views = document
            .get(VIEWS_KEY)
            .and_then(Value::as_object)
            .ok_or_else(|| ConfigError::MissingKey {
                view: String::new(),
                key: VIEWS_KEY.to_string(),
            })?;

        let mut loaded = Vec::with_capacity(views.len());
        for (view_id, entry) in views {
            let view = load_view(view_id, entry)?;
            if view.fingerprint().is_empty() {
                log::warn!(
                    "View '{}' has no search pixels and will match every screen",
                    view.name()
                );
            }
            loaded.push(view);
        }
        Ok(Self::new(loaded))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, View> {
        self.views.iter()
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl<'a> IntoIterator for &'a ViewCatalog {
    type Item = &'a View;
    type IntoIter = std::slice::Iter<'a, View>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reads and parses a catalog JSON file.
pub fn read_catalog_document(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Loads a catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<ViewCatalog, ConfigError> {
    let document = read_catalog_document(path)?;
    let catalog = ViewCatalog::from_value(&document)?;
    log::info!(
        "Loaded {} view(s) from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

fn load_view(view_id: &str, entry: &Value) -> Result<View, ConfigError> {
    let fields = entry.as_object().ok_or_else(|| ConfigError::InvalidEntry {
        view: view_id.to_string(),
        key: VIEWS_KEY.to_string(),
        entry: view_id.to_string(),
        reason: "expected an object".to_string(),
    })?;

    let name = required_str(view_id, fields, NAME_KEY)?;
    if name.is_empty() {
        return Err(ConfigError::InvalidEntry {
            view: view_id.to_string(),
            key: NAME_KEY.to_string(),
            entry: view_id.to_string(),
            reason: "name must not be empty".to_string(),
        });
    }
    let reference = required_str(view_id, fields, REFERENCE_KEY)?;
    let mut builder = View::builder(name, reference);

    let search_pixels = required(view_id, fields, SEARCH_PIXELS_KEY)?;
    builder = for_each_entry(view_id, SEARCH_PIXELS_KEY, search_pixels, builder, |b, e| {
        Ok(b.search_pixel(parse_search_pixel(view_id, e)?))
    })?;

    if let Some(touches) = fields.get(TOUCHES_KEY) {
        builder = for_each_entry(view_id, TOUCHES_KEY, touches, builder, |b, e| {
            let [x, y] = parse_ints::<2>(view_id, TOUCHES_KEY, e)?;
            Ok(b.tap(Coordinate::new(
                to_u32(view_id, TOUCHES_KEY, e, x)?,
                to_u32(view_id, TOUCHES_KEY, e, y)?,
            )))
        })?;
    }

    if let Some(long_touches) = fields.get(LONG_TOUCHES_KEY) {
        builder = for_each_entry(view_id, LONG_TOUCHES_KEY, long_touches, builder, |b, e| {
            let [x, y, duration] = parse_ints::<3>(view_id, LONG_TOUCHES_KEY, e)?;
            Ok(b.long_tap(TimedCoordinate::new(
                to_u32(view_id, LONG_TOUCHES_KEY, e, x)?,
                to_u32(view_id, LONG_TOUCHES_KEY, e, y)?,
                duration,
            )))
        })?;
    }

    if let Some(delay) = fields.get(DELAY_KEY) {
        let delay_ms = delay.as_u64().ok_or_else(|| ConfigError::InvalidEntry {
            view: view_id.to_string(),
            key: DELAY_KEY.to_string(),
            entry: delay.to_string(),
            reason: "expected a non-negative integer".to_string(),
        })?;
        builder = builder.action_delay_ms(delay_ms);
    }

    Ok(builder.build())
}

fn required<'a>(view_id: &str, fields: &'a Map<String, Value>, key: &str) -> Result<&'a Value, ConfigError> {
    fields.get(key).ok_or_else(|| ConfigError::MissingKey {
        view: view_id.to_string(),
        key: key.to_string(),
    })
}

fn required_str<'a>(view_id: &str, fields: &'a Map<String, Value>, key: &str) -> Result<&'a str, ConfigError> {
    let value = required(view_id, fields, key)?;
    value.as_str().ok_or_else(|| ConfigError::InvalidEntry {
        view: view_id.to_string(),
        key: key.to_string(),
        entry: value.to_string(),
        reason: "expected a string".to_string(),
    })
}

/// Folds every entry of an inner mapping into the builder, in document order.
fn for_each_entry<F>(
    view_id: &str,
    key: &str,
    mapping: &Value,
    mut builder: ViewBuilder,
    mut apply: F,
) -> Result<ViewBuilder, ConfigError>
where
    F: FnMut(ViewBuilder, &Value) -> Result<ViewBuilder, ConfigError>,
{
    let entries = mapping.as_object().ok_or_else(|| ConfigError::InvalidEntry {
        view: view_id.to_string(),
        key: key.to_string(),
        entry: mapping.to_string(),
        reason: "expected an object".to_string(),
    })?;
    for entry in entries.values() {
        builder = apply(builder, entry)?;
    }
    Ok(builder)
}

fn parse_search_pixel(view_id: &str, entry: &Value) -> Result<ColorFingerprintPoint, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEntry {
        view: view_id.to_string(),
        key: SEARCH_PIXELS_KEY.to_string(),
        entry: entry.to_string(),
        reason: reason.to_string(),
    };

    let items = entry
        .as_array()
        .filter(|items| items.len() == 3)
        .ok_or_else(|| invalid("expected [x, y, \"#rrggbb\"]"))?;
    let x = items[0].as_u64().ok_or_else(|| invalid("x must be a non-negative integer"))?;
    let y = items[1].as_u64().ok_or_else(|| invalid("y must be a non-negative integer"))?;
    let raw_color = items[2].as_str().ok_or_else(|| invalid("color must be a string"))?;
    let color = HexColor::parse(raw_color).ok_or_else(|| ConfigError::InvalidColor {
        view: view_id.to_string(),
        value: raw_color.to_string(),
    })?;

    Ok(ColorFingerprintPoint::new(
        Coordinate::new(
            to_u32(view_id, SEARCH_PIXELS_KEY, entry, x)?,
            to_u32(view_id, SEARCH_PIXELS_KEY, entry, y)?,
        ),
        color,
    ))
}

/// Parses an array of exactly `N` non-negative integers.
fn parse_ints<const N: usize>(view_id: &str, key: &str, entry: &Value) -> Result<[u64; N], ConfigError> {
    let invalid = || ConfigError::InvalidEntry {
        view: view_id.to_string(),
        key: key.to_string(),
        entry: entry.to_string(),
        reason: format!("expected {} non-negative integers", N),
    };

    let items = entry.as_array().filter(|items| items.len() == N).ok_or_else(invalid)?;
    let mut values = [0u64; N];
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = item.as_u64().ok_or_else(invalid)?;
    }
    Ok(values)
}

fn to_u32(view_id: &str, key: &str, entry: &Value, value: u64) -> Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| ConfigError::InvalidEntry {
        view: view_id.to_string(),
        key: key.to_string(),
        entry: entry.to_string(),
        reason: format!("coordinate {} is out of range", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample_document() -> Value {
        json!({
            "views": {
                "zeta": {
                    "name": "Login",
                    "reference": "dumps/login.dump",
                    "searchPixels": {
                        "b": [10, 20, "#FF0000"],
                        "a": [11, 21, "#00ff00"]
                    },
                    "touches": { "z": [100, 200], "y": [1, 2] },
                    "longtouches": { "only": [300, 400, 800] },
                    "delay": 150
                },
                "alpha": {
                    "name": "Home",
                    "reference": "dumps/home.dump",
                    "searchPixels": { "p": [0, 0, "#000000"] }
                }
            }
        })
    }

    #[test]
    fn test_round_trip_preserves_values_and_order() {
        let catalog = ViewCatalog::from_value(&sample_document()).unwrap();
        assert_eq!(catalog.len(), 2);

        // Document order, not key order.
        let login = &catalog.views()[0];
        assert_eq!(login.name(), "Login");
        assert_eq!(login.reference_path(), Path::new("dumps/login.dump"));
        assert_eq!(
            login.fingerprint(),
            &[
                ColorFingerprintPoint::new(Coordinate::new(10, 20), HexColor::from_rgb(255, 0, 0)),
                ColorFingerprintPoint::new(Coordinate::new(11, 21), HexColor::from_rgb(0, 255, 0)),
            ]
        );
        assert_eq!(login.taps(), &[Coordinate::new(100, 200), Coordinate::new(1, 2)]);
        assert_eq!(login.long_taps(), &[TimedCoordinate::new(300, 400, 800)]);
        assert_eq!(login.action_delay_ms(), 150);

        let home = &catalog.views()[1];
        assert_eq!(home.name(), "Home");
        assert!(home.taps().is_empty());
        assert!(home.long_taps().is_empty());
        assert_eq!(home.action_delay_ms(), 100);
    }

    #[test]
    fn test_missing_views_key() {
        let err = ViewCatalog::from_value(&json!({ "screens": {} })).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { ref key, .. } if key == "views"));
    }

    #[test]
    fn test_missing_required_fields() {
        for missing in [NAME_KEY, REFERENCE_KEY, SEARCH_PIXELS_KEY] {
            let mut doc = sample_document();
            doc["views"]["alpha"].as_object_mut().unwrap().remove(missing);
            let err = ViewCatalog::from_value(&doc).unwrap_err();
            match err {
                ConfigError::MissingKey { view, key } => {
                    assert_eq!(view, "alpha");
                    assert_eq!(key, missing);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let mut doc = sample_document();
        doc["views"]["alpha"]["touches"] = json!({ "t": [1, 2, 3] });
        assert!(matches!(
            ViewCatalog::from_value(&doc),
            Err(ConfigError::InvalidEntry { .. })
        ));

        let mut doc = sample_document();
        doc["views"]["alpha"]["longtouches"] = json!({ "t": [1, 2] });
        assert!(matches!(
            ViewCatalog::from_value(&doc),
            Err(ConfigError::InvalidEntry { .. })
        ));

        let mut doc = sample_document();
        doc["views"]["alpha"]["searchPixels"] = json!({ "p": [1, 2] });
        assert!(matches!(
            ViewCatalog::from_value(&doc),
            Err(ConfigError::InvalidEntry { .. })
        ));
    }

    #[test]
    fn test_negative_coordinate_is_rejected() {
        let mut doc = sample_document();
        doc["views"]["alpha"]["touches"] = json!({ "t": [-1, 2] });
        assert!(matches!(
            ViewCatalog::from_value(&doc),
            Err(ConfigError::InvalidEntry { .. })
        ));
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let mut doc = sample_document();
        doc["views"]["alpha"]["searchPixels"] = json!({ "p": [1, 2, "red"] });
        assert!(matches!(
            ViewCatalog::from_value(&doc),
            Err(ConfigError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_empty_fingerprint_is_allowed() {
        let doc = json!({
            "views": { "any": { "name": "Any", "reference": "", "searchPixels": {} } }
        });
        let catalog = ViewCatalog::from_value(&doc).unwrap();
        assert!(catalog.views()[0].fingerprint().is_empty());
    }

    #[test]
    fn test_load_catalog_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("views.json");
        fs::write(&path, sample_document().to_string()).unwrap();

        let catalog = load_catalog(&path).unwrap();
        let names: Vec<&str> = catalog.iter().map(View::name).collect();
        assert_eq!(names, vec!["Login", "Home"]);
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_catalog(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
