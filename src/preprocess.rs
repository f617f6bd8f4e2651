use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::{Error, Result};
use crate::settings::DEFAULT_QUALITY;

/// Downscales an image so its longer edge fits `max_dimension`, then encodes
/// it as JPEG at the given quality factor (0.0 to 1.0). Images that already
/// fit are re-encoded without resizing; nothing is ever upscaled.
pub fn resize_and_encode(
    image: &DynamicImage,
    max_dimension: u32,
    quality: f32,
) -> Result<Vec<u8>> {
    let (width, height) = (image.width(), image.height());

    let rgb = match target_dimensions(width, height, max_dimension) {
        Some((target_width, target_height)) => {
            debug!(
                "resizing {}x{} to {}x{} (max dimension {})",
                width, height, target_width, target_height, max_dimension
            );
            image
                .resize_exact(target_width, target_height, FilterType::Lanczos3)
                .to_rgb8()
        }
        None => image.to_rgb8(),
    };

    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, jpeg_quality(quality));
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|err| Error::Encode(err.to_string()))?;
    debug!("encoded jpeg payload: {} bytes", encoded.len());
    Ok(encoded)
}

/// Returns the resize target, or None when the image already fits the bound
/// on both axes. The longer edge lands on `max_dimension` exactly; the other
/// edge is rounded to whole pixels with a floor of 1.
fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    if width <= max_dimension && height <= max_dimension {
        return None;
    }
    let max = max_dimension.max(1) as f64;
    let ratio = width as f64 / height as f64;
    let (target_width, target_height) = if ratio > 1.0 {
        (max, max / ratio)
    } else {
        (max * ratio, max)
    };
    Some((
        (target_width.round() as u32).max(1),
        (target_height.round() as u32).max(1),
    ))
}

fn jpeg_quality(quality: f32) -> u8 {
    let quality = if quality.is_finite() && quality > 0.0 {
        quality
    } else {
        DEFAULT_QUALITY
    };
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}
