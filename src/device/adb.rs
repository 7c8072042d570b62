//! `Device` implementation backed by the `adb` command-line tool.
//!
//! Every operation is one blocking `adb` invocation. When running on the
//! device itself (e.g. from a terminal app), the `adb shell` prefix is dropped
//! and the shell command is executed directly.

use std::process::{Command, Output};

use super::dumpsys::{parse_orientation, parse_screen_size};
use super::{Device, DeviceOrientation};
use crate::capture::BYTES_PER_PIXEL;
use crate::error::{ActionInjectionError, CaptureError, DeviceError};
use crate::view::{Coordinate, TimedCoordinate};

/// Header sizes written by `screencap` in raw mode: width, height, format
/// and, on newer Android releases, a colorspace word.
const SCREENCAP_HEADER_SIZES: [usize; 2] = [12, 16];

#[derive(Clone, Debug)]
pub struct AdbDevice {
    adb_path: String,
    /// `ip:port` of a network device, passed to `adb -s` and `adb connect`.
    address: Option<String>,
    run_on_device: bool,
}

impl AdbDevice {
    pub fn new(adb_path: impl Into<String>, address: Option<String>, run_on_device: bool) -> Self {
        Self {
            adb_path: adb_path.into(),
            address,
            run_on_device,
        }
    }

    /// Runs `adb connect` for network devices. A no-op for USB or on-device use.
    pub fn connect(&self) -> Result<(), DeviceError> {
        let Some(address) = self.address.as_deref() else {
            return Ok(());
        };
        if self.run_on_device {
            return Ok(());
        }

        let mut command = Command::new(&self.adb_path);
        command.arg("connect").arg(address);
        let description = describe(&command);
        let output = command.output().map_err(|source| DeviceError::Command {
            command: description.clone(),
            source,
        })?;
        check_device_output(&description, &output)?;
        log::info!(
            "adb connect {}: {}",
            address,
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(())
    }

    /// Builds the command that runs `shell_args` on the device.
    fn shell(&self, shell_args: &[&str]) -> Command {
        if self.run_on_device {
            let mut command = Command::new(shell_args[0]);
            command.args(&shell_args[1..]);
            return command;
        }

        let mut command = Command::new(&self.adb_path);
        if let Some(address) = &self.address {
            command.arg("-s").arg(address);
        }
        command.arg("shell").args(shell_args);
        command
    }

    fn query(&self, shell_args: &[&str]) -> Result<String, DeviceError> {
        let mut command = self.shell(shell_args);
        let description = describe(&command);
        let output = command.output().map_err(|source| DeviceError::Command {
            command: description.clone(),
            source,
        })?;
        check_device_output(&description, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn inject(&self, action: String, shell_args: &[&str]) -> Result<(), ActionInjectionError> {
        let output = self
            .shell(shell_args)
            .output()
            .map_err(|source| ActionInjectionError::Command {
                action: action.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ActionInjectionError::Rejected {
                action,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl Device for AdbDevice {
    fn capture_screen(&self, width: u32, height: u32) -> Result<Vec<u8>, CaptureError> {
        let mut command = self.shell(&["screencap"]);
        let description = describe(&command);
        let output = command.output().map_err(|source| CaptureError::Command {
            command: description.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(CaptureError::CommandFailed {
                command: description,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(strip_screencap_header(output.stdout, width, height))
    }

    fn tap(&self, at: Coordinate) -> Result<(), ActionInjectionError> {
        let (x, y) = (at.x.to_string(), at.y.to_string());
        self.inject(
            format!("tap {}", at),
            &["input", "touchscreen", "tap", x.as_str(), y.as_str()],
        )
    }

    fn long_tap(&self, at: TimedCoordinate) -> Result<(), ActionInjectionError> {
        let (x, y) = (at.x.to_string(), at.y.to_string());
        let duration = at.duration_ms.to_string();
        self.inject(
            format!("long tap {}", at),
            &[
                "input",
                "touchscreen",
                "swipe",
                x.as_str(),
                y.as_str(),
                x.as_str(),
                y.as_str(),
                duration.as_str(),
            ],
        )
    }

    fn reconnect(&self) -> Result<(), DeviceError> {
        if self.address.is_some() {
            return self.connect();
        }
        if self.run_on_device {
            return Ok(());
        }

        let mut command = Command::new(&self.adb_path);
        command.arg("reconnect");
        let description = describe(&command);
        let output = command.output().map_err(|source| DeviceError::Command {
            command: description.clone(),
            source,
        })?;
        check_device_output(&description, &output)
    }

    fn orientation(&self) -> Result<DeviceOrientation, DeviceError> {
        let input = self.query(&["dumpsys", "input"])?;
        if let Some(orientation) = parse_orientation(&input) {
            return Ok(orientation);
        }

        let window = self.query(&["dumpsys", "window", "displays"])?;
        parse_orientation(&window).ok_or_else(|| {
            DeviceError::UnrecognizedOutput("no SurfaceOrientation or mCurrentRotation".to_string())
        })
    }

    fn physical_size(&self) -> Result<(u32, u32), DeviceError> {
        let text = self.query(&["wm", "size"])?;
        parse_screen_size(&text).ok_or(DeviceError::UnrecognizedOutput(text))
    }
}

/// Removes the raw `screencap` header when the payload length shows one is present.
pub fn strip_screencap_header(mut bytes: Vec<u8>, width: u32, height: u32) -> Vec<u8> {
    let pixels = width as usize * height as usize * BYTES_PER_PIXEL;
    if let Some(header) = SCREENCAP_HEADER_SIZES
        .iter()
        .copied()
        .find(|header| bytes.len() == pixels + header)
    {
        bytes.drain(..header);
    }
    bytes
}

fn describe(command: &Command) -> String {
    let mut parts = vec![command.get_program().to_string_lossy().into_owned()];
    parts.extend(command.get_args().map(|arg| arg.to_string_lossy().into_owned()));
    parts.join(" ")
}

fn check_device_output(description: &str, output: &Output) -> Result<(), DeviceError> {
    if output.status.success() {
        return Ok(());
    }
    Err(DeviceError::CommandFailed {
        command: description.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ScreenSample;

    #[test]
    fn test_strip_legacy_header() {
        let mut bytes = vec![0xAA; 12];
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        assert_eq!(strip_screencap_header(bytes, 1, 1), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_strip_colorspace_header() {
        let mut bytes = vec![0xAA; 16];
        bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            strip_screencap_header(bytes, 2, 1),
            vec![1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn test_headerless_buffer_untouched() {
        let bytes = vec![9; 16];
        assert_eq!(strip_screencap_header(bytes.clone(), 2, 2), bytes);
    }

    #[test]
    fn test_header_of_differently_sized_screen_is_rejected() {
        // A 4x3 device captured with 2x2 configured.
        let mut bytes = vec![0xEE; 16];
        bytes.extend_from_slice(&[0; 4 * 3 * 4]);
        let bytes = strip_screencap_header(bytes, 2, 2);

        assert_eq!(bytes.len(), 16 + 4 * 3 * 4);
        assert!(matches!(
            ScreenSample::from_raw(2, 2, bytes),
            Err(CaptureError::BufferSize { expected: 16, .. })
        ));
    }

    #[test]
    fn test_shell_command_over_network() {
        let device = AdbDevice::new("adb", Some("10.0.0.5:5555".to_string()), false);
        let command = device.shell(&["input", "touchscreen", "tap", "1", "2"]);
        assert_eq!(
            describe(&command),
            "adb -s 10.0.0.5:5555 shell input touchscreen tap 1 2"
        );
    }

    #[test]
    fn test_shell_command_on_device() {
        let device = AdbDevice::new("adb", None, true);
        let command = device.shell(&["screencap"]);
        assert_eq!(describe(&command), "screencap");
    }
}
