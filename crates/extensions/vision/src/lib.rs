//! # uiprobe Vision
//!
//! Pixel-level perception:
//!
//! - [`TemplateImageMatcher`] - normalized cross-correlation with non-max suppression
//! - [`CoordinateMapper`] - logical/physical pixel conversion
//! - [`TemplateVisibleCheck`] - wait for a template to appear or disappear
//! - `DesktopCapture` - primary monitor capture (`desktop` feature)
//! - [`VisionToolProvider`] - the `vision_find_template` tool

#[cfg(feature = "desktop")]
pub mod capture;
pub mod check;
pub mod error;
pub mod image_utils;
pub mod mapper;
pub mod matcher;
pub mod tools;

#[cfg(feature = "desktop")]
pub use capture::DesktopCapture;
pub use check::TemplateVisibleCheck;
pub use error::VisionError;
pub use mapper::CoordinateMapper;
pub use matcher::{ScoredMatch, TemplateImageMatcher};
pub use tools::{FindTemplateTool, VisionToolProvider};
