//! Shared value types.

mod element;
mod geometry;
mod screenshot;
mod usage;

pub use element::*;
pub use geometry::*;
pub use screenshot::*;
pub use usage::*;
