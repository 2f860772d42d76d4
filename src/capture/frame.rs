//! Frame type representing a captured image with metadata.

use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::time::Instant;
use thiserror::Error;

/// Bytes per pixel in an RGB8 frame.
pub(crate) const RGB_CHANNELS: usize = 3;

/// Errors that can occur while rasterising a frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("pixel buffer does not match {width}x{height} RGB frame")]
    SizeMismatch { width: u32, height: u32 },
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}

/// A single captured frame from the camera.
///
/// Pixels are packed RGB8, row-major.
#[derive(Clone)]
pub struct Frame {
    /// Raw RGB pixel data.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Capture timestamp.
    timestamp: Instant,
    /// Monotonic sequence number within a session.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count() * RGB_CHANNELS
    }

    /// Rasterises the frame into an off-screen buffer and encodes it as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, FrameError> {
        let raster = RgbImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            FrameError::SizeMismatch {
                width: self.width,
                height: self.height,
            },
        )?;

        let mut encoded = Cursor::new(Vec::new());
        raster.write_to(&mut encoded, ImageFormat::Png)?;
        Ok(encoded.into_inner())
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_frame_creation() {
        let pixels = vec![0u8; 64 * 48 * 3];
        let frame = Frame::new(pixels, 64, 48, 1);

        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_invalid_size() {
        let pixels = vec![0u8; 100];
        let frame = Frame::new(pixels, 64, 48, 1);

        assert!(!frame.is_valid());
        assert!(matches!(
            frame.encode_png(),
            Err(FrameError::SizeMismatch { width: 64, height: 48 })
        ));
    }

    #[test]
    fn test_encode_png_signature() {
        let frame = Frame::new(vec![128u8; 16 * 8 * 3], 16, 8, 1);
        let png = frame.encode_png().unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }
}
