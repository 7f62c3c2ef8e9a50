//! Verification check protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifiedError;
use crate::types::Screenshot;

/// Result of one verification attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl CheckOutcome {
    pub fn passed(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Externally supplied check, invoked once per attempt against a screenshot
/// captured immediately before the call.
#[async_trait]
pub trait VerificationCheck: Send + Sync {
    async fn check(&self, screenshot: &Screenshot) -> Result<CheckOutcome, ClassifiedError>;
}
