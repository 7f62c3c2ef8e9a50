//! Primary monitor capture.

use std::io::Cursor;

use async_trait::async_trait;
use screenshots::Screen;
use screenshots::image::{ImageOutputFormat, RgbaImage, imageops};
use tracing::debug;

use uiprobe_protocols::{CaptureError, Rect, ScreenCapture, Screenshot};

/// [`ScreenCapture`] backed by the `screenshots` crate.
///
/// Captures are always taken at the monitor's native (physical) resolution,
/// so `high_resolution` needs no special handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopCapture;

impl DesktopCapture {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScreenCapture for DesktopCapture {
    async fn capture(
        &self,
        region: Option<Rect>,
        _high_resolution: bool,
    ) -> Result<Screenshot, CaptureError> {
        tokio::task::spawn_blocking(move || capture_primary(region))
            .await
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?
    }
}

fn primary_screen() -> Result<Screen, CaptureError> {
    let screens = Screen::all().map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;
    screens
        .into_iter()
        .find(|s| s.display_info.is_primary)
        .or_else(|| Screen::all().ok()?.into_iter().next())
        .ok_or(CaptureError::NoMonitor)
}

fn capture_primary(region: Option<Rect>) -> Result<Screenshot, CaptureError> {
    let screen = primary_screen()?;
    let image = screen
        .capture()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

    let image = match region {
        Some(rect) => crop(&image, rect)?,
        None => image,
    };
    debug!("Captured {}x{} physical pixels", image.width(), image.height());
    encode_png(&image)
}

/// Crop to `rect`, clamped to the image bounds.
fn crop(image: &RgbaImage, rect: Rect) -> Result<RgbaImage, CaptureError> {
    let x = rect.x.max(0) as u32;
    let y = rect.y.max(0) as u32;
    if x >= image.width() || y >= image.height() || rect.is_empty() {
        return Err(CaptureError::CaptureFailed(format!(
            "Region {:?} is outside the {}x{} screen",
            rect,
            image.width(),
            image.height()
        )));
    }
    let width = rect.width.min(image.width() - x);
    let height = rect.height.min(image.height() - y);
    Ok(imageops::crop_imm(image, x, y, width, height).to_image())
}

fn encode_png(image: &RgbaImage) -> Result<Screenshot, CaptureError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;
    Ok(Screenshot::new(buffer.into_inner(), image.width(), image.height()))
}
