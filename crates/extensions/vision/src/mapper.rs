//! Logical/physical pixel conversion.
//!
//! Tool-facing coordinates are logical; capture and matching work in
//! physical pixels. A scale factor is physical pixels per logical pixel.

use uiprobe_config::DisplayConfig;
use uiprobe_protocols::{Point, Rect};

use crate::error::VisionError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scale_x: f64,
    scale_y: f64,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::identity()
    }
}

impl CoordinateMapper {
    /// Scale factors must be positive and finite.
    pub fn new(scale_x: f64, scale_y: f64) -> Result<Self, VisionError> {
        check_scale("x", scale_x)?;
        check_scale("y", scale_y)?;
        Ok(Self { scale_x, scale_y })
    }

    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn from_config(config: &DisplayConfig) -> Result<Self, VisionError> {
        Self::new(config.scale_x, config.scale_y)
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn to_physical_point(&self, point: Point) -> Point {
        Point::new(
            scale(point.x as f64, self.scale_x),
            scale(point.y as f64, self.scale_y),
        )
    }

    pub fn to_logical_point(&self, point: Point) -> Point {
        Point::new(
            scale(point.x as f64, 1.0 / self.scale_x),
            scale(point.y as f64, 1.0 / self.scale_y),
        )
    }

    /// Edges are converted independently so adjacent rectangles stay adjacent.
    pub fn to_physical_rect(&self, rect: Rect) -> Rect {
        self.map_rect(rect, self.scale_x, self.scale_y)
    }

    pub fn to_logical_rect(&self, rect: Rect) -> Rect {
        self.map_rect(rect, 1.0 / self.scale_x, 1.0 / self.scale_y)
    }

    fn map_rect(&self, rect: Rect, sx: f64, sy: f64) -> Rect {
        let left = scale(rect.x as f64, sx);
        let top = scale(rect.y as f64, sy);
        let right = scale(rect.right() as f64, sx);
        let bottom = scale(rect.bottom() as f64, sy);
        Rect::new(
            left,
            top,
            (right - left).max(0) as u32,
            (bottom - top).max(0) as u32,
        )
    }
}

fn check_scale(axis: &'static str, value: f64) -> Result<(), VisionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(VisionError::InvalidScale { axis, value })
    }
}

fn scale(value: f64, factor: f64) -> i32 {
    (value * factor).round() as i32
}
