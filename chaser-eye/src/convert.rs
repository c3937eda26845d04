//! Conversion of decoded images into controller frames

use chaser_core::{Frame, SourceError};
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Largest image accepted, in pixels
const MAX_PIXELS: u64 = 100_000_000;

/// Convert a decoded image into a frame.
///
/// 8-bit grayscale images become `Mono8` frames; everything else is
/// converted to packed `Rgb8`, matching a color camera stream.
pub fn frame_from_image(image: &DynamicImage) -> Result<Frame, SourceError> {
    let (width, height) = (image.width(), image.height());

    if width == 0 || height == 0 {
        return Err(SourceError::Layout("image has zero area".to_string()));
    }

    let total_pixels = u64::from(width) * u64::from(height);
    if total_pixels > MAX_PIXELS {
        return Err(SourceError::Layout(format!(
            "image too large ({}x{}, max {} pixels)",
            width, height, MAX_PIXELS
        )));
    }

    let (width, height) = (width as usize, height as usize);
    let frame = match image {
        DynamicImage::ImageLuma8(gray) => Frame::mono8(height, width, gray.as_raw().clone()),
        other => Frame::rgb8(height, width, other.to_rgb8().into_raw()),
    };

    debug!(
        "Converted {}x{} image to {} frame (stride {})",
        width,
        height,
        frame.encoding(),
        frame.stride()
    );
    Ok(frame)
}

/// Decode an image file into a frame
pub fn frame_from_path(path: impl AsRef<Path>) -> Result<Frame, SourceError> {
    let path = path.as_ref();
    let image = image::open(path)
        .map_err(|e| SourceError::Decode(format!("{}: {}", path.display(), e)))?;
    frame_from_image(&image)
}
