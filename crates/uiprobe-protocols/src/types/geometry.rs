//! Pixel geometry.
//!
//! The same types carry both logical (UI-space) and physical (device-pixel)
//! coordinates; which space a value lives in is a property of the API that
//! produced it, not of the type.

use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Center point, rounded towards the origin.
    pub fn center(&self) -> Point {
        Point::new(
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        let (px, py) = (point.x as i64, point.y as i64);
        px >= self.x as i64 && px < self.right() && py >= self.y as i64 && py < self.bottom()
    }

    /// Area shared by both rectangles.
    pub fn intersection_area(&self, other: &Rect) -> u64 {
        let left = (self.x as i64).max(other.x as i64);
        let top = (self.y as i64).max(other.y as i64);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return 0;
        }
        ((right - left) * (bottom - top)) as u64
    }

    /// Intersection over union, in `[0, 1]`.
    pub fn overlap_ratio(&self, other: &Rect) -> f64 {
        let intersection = self.intersection_area(other);
        if intersection == 0 {
            return 0.0;
        }
        let union = self.area() + other.area() - intersection;
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
