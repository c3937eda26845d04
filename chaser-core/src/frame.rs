//! Camera frames as seen by the controller

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel layout of a frame buffer.
///
/// Metadata only: the locator scans raw bytes whatever the encoding, so on
/// a three-channel image every channel byte is a candidate pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelEncoding {
    /// One intensity byte per pixel
    #[default]
    Mono8,
    /// Three bytes per pixel, red first
    Rgb8,
    /// Three bytes per pixel, blue first
    Bgr8,
}

impl PixelEncoding {
    /// Bytes occupied by a single pixel
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelEncoding::Mono8 => 1,
            PixelEncoding::Rgb8 | PixelEncoding::Bgr8 => 3,
        }
    }
}

impl fmt::Display for PixelEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelEncoding::Mono8 => "mono8",
            PixelEncoding::Rgb8 => "rgb8",
            PixelEncoding::Bgr8 => "bgr8",
        };
        f.write_str(name)
    }
}

/// One camera image: row-major bytes with `height` rows of `stride` bytes.
///
/// Cloning is cheap, the pixel buffer is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    height: usize,
    width: usize,
    stride: usize,
    encoding: PixelEncoding,
    pixels: Bytes,
}

impl Frame {
    /// Wrap a raw buffer. No validation happens here; a buffer that does
    /// not match its geometry is simply never found to contain a target.
    pub fn new(
        height: usize,
        width: usize,
        stride: usize,
        encoding: PixelEncoding,
        pixels: impl Into<Bytes>,
    ) -> Self {
        Self {
            height,
            width,
            stride,
            encoding,
            pixels: pixels.into(),
        }
    }

    /// Single-channel frame where stride equals width
    pub fn mono8(height: usize, width: usize, pixels: impl Into<Bytes>) -> Self {
        Self::new(height, width, width, PixelEncoding::Mono8, pixels)
    }

    /// Packed three-channel frame, stride is `3 * width`
    pub fn rgb8(height: usize, width: usize, pixels: impl Into<Bytes>) -> Self {
        Self::new(height, width, width * 3, PixelEncoding::Rgb8, pixels)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of bytes the geometry claims, `None` on overflow
    pub fn expected_len(&self) -> Option<usize> {
        self.height.checked_mul(self.stride)
    }

    /// True when the buffer length matches `height * stride` and the area is non-zero
    pub fn is_well_formed(&self) -> bool {
        match self.expected_len() {
            Some(len) => len > 0 && len == self.pixels.len(),
            None => false,
        }
    }
}
