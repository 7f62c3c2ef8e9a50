//! Token budget ledger.
//!
//! One [`BudgetManager`] per run, shared by `Arc` with every call site that
//! consumes model tokens.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use uiprobe_config::BudgetConfig;
use uiprobe_protocols::Usage;

use crate::error::BudgetError;

/// Point-in-time view of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTotals {
    pub total_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cached_tokens: u64,
    pub ceiling: i64,
    pub by_model: HashMap<String, Usage>,
}

/// Token usage accumulators with a ceiling.
///
/// `total` counts input plus output; cached tokens are reported separately
/// and never reduce it. A ceiling `<= 0` is unlimited.
#[derive(Debug, Default)]
pub struct BudgetManager {
    ceiling: AtomicI64,
    total: AtomicU64,
    input: AtomicU64,
    output: AtomicU64,
    cached: AtomicU64,
    by_model: DashMap<String, Usage>,
    /// Consumers share it, `reset` takes it exclusively.
    reset_guard: RwLock<()>,
}

impl BudgetManager {
    pub fn new(ceiling: i64) -> Self {
        Self {
            ceiling: AtomicI64::new(ceiling),
            ..Default::default()
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self::new(config.token_ceiling)
    }

    pub fn ceiling(&self) -> i64 {
        self.ceiling.load(Ordering::SeqCst)
    }

    pub fn set_ceiling(&self, ceiling: i64) {
        self.ceiling.store(ceiling, Ordering::SeqCst);
    }

    /// Add one model call's usage to the ledger. Counters saturate at
    /// `u64::MAX` instead of wrapping.
    pub fn consume_tokens(&self, model_id: &str, input: u64, output: u64, cached: u64) {
        let _guard = self.reset_guard.read();

        let total = saturating_add(&self.total, input.saturating_add(output));
        saturating_add(&self.input, input);
        saturating_add(&self.output, output);
        saturating_add(&self.cached, cached);
        *self.by_model.entry(model_id.to_string()).or_default() += Usage::new(input, output, cached);

        debug!(
            "Consumed tokens: model={}, input={}, output={}, cached={}, total={}",
            model_id, input, output, cached, total
        );
    }

    /// Add a provider usage record.
    pub fn record(&self, model_id: &str, usage: &Usage) {
        self.consume_tokens(
            model_id,
            usage.input_tokens,
            usage.output_tokens,
            usage.cached_tokens,
        );
    }

    /// Fails once the total is strictly above a positive ceiling.
    pub fn check_budget(&self) -> Result<(), BudgetError> {
        let ceiling = self.ceiling();
        if ceiling <= 0 {
            return Ok(());
        }

        let used = self.total_tokens();
        if used > ceiling as u64 {
            warn!("Token budget exceeded: used {} of {}", used, ceiling);
            return Err(BudgetError::Exceeded { used, ceiling });
        }
        Ok(())
    }

    /// Tokens left before the ceiling, `None` when unlimited.
    pub fn remaining(&self) -> Option<u64> {
        let ceiling = self.ceiling();
        (ceiling > 0).then(|| (ceiling as u64).saturating_sub(self.total_tokens()))
    }

    /// Zero every accumulator, excluding concurrent consumers.
    pub fn reset(&self) {
        let _guard = self.reset_guard.write();
        self.total.store(0, Ordering::SeqCst);
        self.input.store(0, Ordering::SeqCst);
        self.output.store(0, Ordering::SeqCst);
        self.cached.store(0, Ordering::SeqCst);
        self.by_model.clear();
        info!("Token budget reset");
    }

    pub fn total_tokens(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn input_tokens(&self) -> u64 {
        self.input.load(Ordering::SeqCst)
    }

    pub fn output_tokens(&self) -> u64 {
        self.output.load(Ordering::SeqCst)
    }

    pub fn cached_tokens(&self) -> u64 {
        self.cached.load(Ordering::SeqCst)
    }

    pub fn usage_for(&self, model_id: &str) -> Option<Usage> {
        self.by_model.get(model_id).map(|usage| *usage)
    }

    /// Consistent copy of all accumulators.
    pub fn snapshot(&self) -> BudgetTotals {
        let _guard = self.reset_guard.write();
        BudgetTotals {
            total_tokens: self.total_tokens(),
            input_tokens: self.input_tokens(),
            output_tokens: self.output_tokens(),
            cached_tokens: self.cached_tokens(),
            ceiling: self.ceiling(),
            by_model: self
                .by_model
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
        }
    }
}

/// Add without wrapping; returns the new value.
fn saturating_add(counter: &AtomicU64, amount: u64) -> u64 {
    let previous = counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
            Some(v.saturating_add(amount))
        })
        .unwrap_or_else(|v| v);
    previous.saturating_add(amount)
}

#[cfg(test)]
#[path = "budget_tests.rs"]
mod tests;
