//! Screen capture protocol.

use async_trait::async_trait;

use crate::error::CaptureError;
use crate::types::{Rect, Screenshot};

/// OS-level screen capture.
///
/// Regions and results are in physical (device) pixels.
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    /// Capture `region`, or the whole primary screen when `None`.
    ///
    /// `high_resolution` asks for the highest-resolution variant the platform
    /// offers; backends without variants ignore it.
    async fn capture(
        &self,
        region: Option<Rect>,
        high_resolution: bool,
    ) -> Result<Screenshot, CaptureError>;
}
