//! # uiprobe Core
//!
//! Aggregates the tools exposed by each component into one [`ToolRegistry`].
//! Registration is explicit: components implement
//! [`ToolProvider`](uiprobe_protocols::ToolProvider) and hand their tool list
//! to the registry at startup.

pub mod error;
pub mod registry;

pub use error::RegistryError;
pub use registry::ToolRegistry;
