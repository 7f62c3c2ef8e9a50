//! Image decoding helpers.

use std::path::Path;

use image::GrayImage;

use uiprobe_protocols::Screenshot;

use crate::error::VisionError;

/// Load an image file as 8-bit grayscale.
pub fn load_gray(path: impl AsRef<Path>) -> Result<GrayImage, VisionError> {
    Ok(image::open(path)?.to_luma8())
}

/// Decode encoded image bytes (PNG, JPEG, ...) as 8-bit grayscale.
pub fn decode_gray(bytes: &[u8]) -> Result<GrayImage, VisionError> {
    Ok(image::load_from_memory(bytes)?.to_luma8())
}

pub fn screenshot_gray(screenshot: &Screenshot) -> Result<GrayImage, VisionError> {
    decode_gray(&screenshot.data)
}
