//! Decoded screen captures and pixel sampling.

use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::Path;

use crate::error::{CaptureError, FingerprintError};
use crate::view::{Coordinate, HexColor};

/// Bytes per pixel of a raw RGBA capture.
pub const BYTES_PER_PIXEL: usize = 4;

/// A decoded, read-only screen grid. Lives for a single poll cycle.
#[derive(Clone, Debug)]
pub struct ScreenSample {
    image: RgbaImage,
}

impl ScreenSample {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Interprets `bytes` as a `width`x`height` RGBA grid.
    ///
    /// The buffer must hold exactly `width * height * 4` bytes; any header has
    /// to be stripped beforehand.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if bytes.len() != expected {
            return Err(CaptureError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }

        let image: RgbaImage = ImageBuffer::from_raw(width, height, bytes).ok_or(
            CaptureError::BufferSize {
                expected,
                actual: expected,
            },
        )?;
        Ok(Self { image })
    }

    /// Reads a raw dump file written by `tools::snapshot`.
    pub fn from_dump(path: &Path, width: u32, height: u32) -> anyhow::Result<Self> {
        use anyhow::Context;

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read screen dump {}", path.display()))?;
        Ok(Self::from_raw(width, height, bytes)?)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Returns the color at `at` as `#rrggbb`. Alpha is ignored.
    pub fn sample(&self, at: Coordinate) -> Result<HexColor, FingerprintError> {
        if at.x >= self.width() || at.y >= self.height() {
            return Err(FingerprintError::OutOfBounds {
                x: at.x,
                y: at.y,
                width: self.width(),
                height: self.height(),
            });
        }
        let Rgba([r, g, b, _]) = *self.image.get_pixel(at.x, at.y);
        Ok(HexColor::from_rgb(r, g, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_returns_hex_color() {
        let mut img = RgbaImage::new(4, 3);
        img.put_pixel(2, 1, Rgba([0x12, 0xab, 0xff, 0x00]));
        let screen = ScreenSample::new(img);

        assert_eq!(screen.sample(Coordinate::new(2, 1)).unwrap().as_str(), "#12abff");
        assert_eq!(screen.sample(Coordinate::new(0, 0)).unwrap().as_str(), "#000000");
    }

    #[test]
    fn test_sample_out_of_bounds() {
        let screen = ScreenSample::new(RgbaImage::new(4, 3));
        assert_eq!(
            screen.sample(Coordinate::new(4, 0)),
            Err(FingerprintError::OutOfBounds {
                x: 4,
                y: 0,
                width: 4,
                height: 3
            })
        );
        assert!(screen.sample(Coordinate::new(0, 3)).is_err());
    }

    #[test]
    fn test_from_raw_row_major() {
        // 2x2 grid; pixel (1, 1) is the fourth one.
        let mut bytes = vec![0u8; 16];
        bytes[12..16].copy_from_slice(&[255, 0, 0, 255]);
        let screen = ScreenSample::from_raw(2, 2, bytes).unwrap();
        assert_eq!(screen.sample(Coordinate::new(1, 1)).unwrap().as_str(), "#ff0000");
    }

    #[test]
    fn test_from_raw_rejects_oversized_buffer() {
        let err = ScreenSample::from_raw(1, 1, vec![1, 2, 3, 4, 9, 9]).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::BufferSize {
                expected: 4,
                actual: 6
            }
        ));
    }

    #[test]
    fn test_from_raw_short_buffer() {
        let err = ScreenSample::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::BufferSize {
                expected: 16,
                actual: 15
            }
        ));
    }
}
