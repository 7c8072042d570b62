//! Daemon settings.
//!
//! Loaded from config.json at startup. Provides the device address, screen
//! size, polling interval and catalog location. Every field has a default, so
//! a partial (or absent) file is fine.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Complete daemon configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Network device as `a.b.c.d:port`. `None` uses the single attached device.
    pub device_address: Option<String>,
    /// Run shell commands directly instead of through `adb shell`
    pub run_on_device: bool,
    /// Path or name of the adb executable
    pub adb_path: String,
    /// Screen width the catalog was authored against
    pub screen_width: u32,
    /// Screen height the catalog was authored against
    pub screen_height: u32,
    /// Wait after an unmatched cycle before backoff is added (milliseconds)
    pub base_interval_ms: u64,
    /// View catalog JSON file
    pub catalog_path: PathBuf,
    /// Query the device rotation each cycle and swap width/height to match
    pub detect_orientation: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            device_address: None,
            run_on_device: false,
            adb_path: "adb".to_string(),
            screen_width: 1920,
            screen_height: 1080,
            base_interval_ms: 100,
            catalog_path: PathBuf::from("views.json"),
            detect_orientation: true,
        }
    }
}

impl BotConfig {
    pub fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    /// Rejects settings the daemon cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(address) = &self.device_address {
            validate_address(address)?;
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(ConfigError::InvalidEntry {
                view: String::new(),
                key: "screen_width/screen_height".to_string(),
                entry: format!("{}x{}", self.screen_width, self.screen_height),
                reason: "screen size must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Checks the `x.x.x.x:port` shape: four dot-separated parts, the last one
/// carrying exactly one `:port` suffix.
pub fn validate_address(address: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = address.split('.').collect();
    let valid = parts.len() == 4
        && parts
            .last()
            .is_some_and(|last| last.split(':').count() == 2);
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidAddress(address.to_string()))
    }
}

/// Returns the default settings location: config.json next to the executable.
pub fn default_config_path() -> PathBuf {
    crate::paths::get_exe_dir().join("config.json")
}

/// Loads settings from `path`, or returns defaults if the file does not exist.
/// An existing but unreadable or malformed file is an error.
pub fn load_config(path: &Path) -> Result<BotConfig, ConfigError> {
    log::debug!("Looking for config at: {}", path.display());

    if !path.exists() {
        log::info!("{} not found. Using default config.", path.display());
        return Ok(BotConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: BotConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    log::info!("Config loaded from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.base_interval_ms, 100);
        assert_eq!(config.screen_size(), (1920, 1080));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "base_interval_ms": 400, "device_address": "192.168.1.20:5555" }"#)
            .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.base_interval_ms, 400);
        assert_eq!(config.device_address.as_deref(), Some("192.168.1.20:5555"));
        assert_eq!(config.adb_path, "adb");
        assert!(config.detect_orientation);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_address_validation() {
        assert!(validate_address("192.168.1.20:5555").is_ok());
        assert!(validate_address("192.168.1.20").is_err());
        assert!(validate_address("localhost:5555").is_err());
        assert!(validate_address("1.2.3.4:5:6").is_err());
    }

    #[test]
    fn test_bad_address_in_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "device_address": "phone" }"#).unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::InvalidAddress(_))
        ));
    }
}
