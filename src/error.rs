//! Error types for catalog loading, capture, fingerprint evaluation and input injection.
//!
//! Only `ConfigError` and `FingerprintError` are fatal. Capture and injection
//! failures are absorbed by the dispatch loop and turned into backoff.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed or incomplete configuration. Raised at load time, before the loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required key is absent. `view` is empty for document-level keys.
    #[error("view '{view}': missing required key '{key}'")]
    MissingKey { view: String, key: String },

    #[error("view '{view}': entry '{entry}' in '{key}' is invalid: {reason}")]
    InvalidEntry {
        view: String,
        key: String,
        entry: String,
        reason: String,
    },

    #[error("view '{view}': '{value}' is not a #rrggbb color")]
    InvalidColor { view: String, value: String },

    #[error("device address should respect the \"x.x.x.x:port\" format, got '{0}'")]
    InvalidAddress(String),
}

/// Screenshot capture or decode failure. Recovered by the loop.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to run '{command}': {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("screen buffer holds {actual} bytes, expected at least {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// A fingerprint point lies outside the decoded screen.
///
/// This is a catalog/device-size mismatch and must never be reported as "no match".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("pixel ({x}, {y}) is outside the {width}x{height} screen")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Tap or swipe injection failure. Logged, never retried within a cycle.
#[derive(Debug, Error)]
pub enum ActionInjectionError {
    #[error("failed to run {action}: {source}")]
    Command {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{action} exited with {status}: {stderr}")]
    Rejected {
        action: String,
        status: String,
        stderr: String,
    },
}

/// Failure of a device diagnostic query (orientation, size) or of a reconnect.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to run '{command}': {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("unrecognized device output: {0}")]
    UnrecognizedOutput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = FingerprintError::OutOfBounds {
            x: 2000,
            y: 10,
            width: 1920,
            height: 1080,
        };
        assert_eq!(
            err.to_string(),
            "pixel (2000, 10) is outside the 1920x1080 screen"
        );
    }

    #[test]
    fn test_missing_key_message() {
        let err = ConfigError::MissingKey {
            view: "login".to_string(),
            key: "searchPixels".to_string(),
        };
        assert!(err.to_string().contains("searchPixels"));
    }
}
