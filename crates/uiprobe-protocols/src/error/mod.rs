//! Error types for the uiprobe protocol layer.

mod capture;
mod category;
mod embedding;
mod index;
mod tool;

pub use capture::*;
pub use category::*;
pub use embedding::*;
pub use index::*;
pub use tool::*;
