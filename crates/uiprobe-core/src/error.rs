//! Registry errors.

use thiserror::Error;

use uiprobe_protocols::{Categorized, ErrorCategory};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Tool not found: {0}")]
    NotFound(String),
}

impl Categorized for RegistryError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::NonRetryableError
    }
}
