//! Token usage reported by model calls.

use serde::{Deserialize, Serialize};

/// Usage information for a single model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Input tokens served from a prompt cache. Informational; already
    /// included in `input_tokens`.
    #[serde(default)]
    pub cached_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64, cached_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            cached_tokens,
        }
    }

    /// Billable total: input plus output regardless of cache overlap.
    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Saturates at `u64::MAX` per field.
impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens = self.input_tokens.saturating_add(rhs.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(rhs.output_tokens);
        self.cached_tokens = self.cached_tokens.saturating_add(rhs.cached_tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_ignores_cached() {
        let usage = Usage::new(50, 30, 20);
        assert_eq!(usage.total(), 80);
    }

    #[test]
    fn test_add_assign() {
        let mut usage = Usage::default();
        usage += Usage::new(1, 2, 3);
        usage += Usage::new(10, 20, 30);
        assert_eq!(usage, Usage::new(11, 22, 33));
    }

    #[test]
    fn test_sums_saturate() {
        let mut usage = Usage::new(u64::MAX, 1, 0);
        assert_eq!(usage.total(), u64::MAX);
        usage += Usage::new(5, u64::MAX, 2);
        assert_eq!(usage, Usage::new(u64::MAX, u64::MAX, 2));
    }

    #[test]
    fn test_cached_defaults_when_missing() {
        let usage: Usage = serde_json::from_str(r#"{"input_tokens":5,"output_tokens":7}"#).unwrap();
        assert_eq!(usage.cached_tokens, 0);
        assert_eq!(usage.total(), 12);
    }
}
