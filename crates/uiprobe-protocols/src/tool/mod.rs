//! Tool protocol definitions.
//!
//! Tools are registered explicitly: every tool-bearing component implements
//! [`ToolProvider`] and hands out a fixed list of tool instances.

mod definition;
mod result;
mod traits;

pub use definition::*;
pub use result::*;
pub use traits::*;
