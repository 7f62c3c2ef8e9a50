//! # uiprobe Protocols
//!
//! Core protocol definitions (traits) for the uiprobe perception and
//! resilience engine. Contains only interface definitions and shared value
//! types - no implementations.
//!
//! ## Core Traits
//!
//! - [`ElementIndex`] - Vector store holding UI element descriptions
//! - [`EmbeddingProvider`] - Text to fixed-dimension vector model
//! - [`ScreenCapture`] - OS-level screen capture in physical pixels
//! - [`VerificationCheck`] - One attempt of a UI state verification
//! - [`Tool`] / [`ToolProvider`] - Explicitly registered agent tools
//! - [`Categorized`] - Maps any error onto the closed [`ErrorCategory`] set

pub mod capture;
pub mod embedding;
pub mod error;
pub mod index;
pub mod tool;
pub mod types;
pub mod verification;

pub use capture::ScreenCapture;
pub use embedding::{Embedding, EmbeddingProvider};
pub use error::{
    CaptureError, Categorized, ClassifiedError, EmbeddingError, ErrorCategory, IndexError,
    Severity, ToolError,
};
pub use index::ElementIndex;
pub use tool::{Tool, ToolDefinition, ToolProvider, ToolResult};
pub use types::*;
pub use verification::{CheckOutcome, VerificationCheck};
