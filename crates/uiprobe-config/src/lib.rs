//! # uiprobe Config
//!
//! Configuration management for the uiprobe engine: display scale factors,
//! vector store connection, embedding model, retrieval and matching
//! thresholds, retry policies and the token budget.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
