//! Cumulative fill tracking keyed by order hash.

use std::collections::HashMap;

use crate::types::OrderHash;

/// Filled amount per order hash.
///
/// Two orders with identical fields and salt share a hash and therefore a
/// counter, so re-submitting the same signed order can never overfill it.
#[derive(Debug, Default, Clone)]
pub struct FillTracker {
    filled: HashMap<OrderHash, u128>,
}

impl FillTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount filled so far
    #[inline]
    pub fn filled(&self, hash: &OrderHash) -> u128 {
        self.filled.get(hash).copied().unwrap_or(0)
    }

    /// Amount still fillable on an order of `size`
    #[inline]
    pub fn unfilled(&self, hash: &OrderHash, size: u128) -> u128 {
        size.saturating_sub(self.filled(hash))
    }

    /// Add `amount` to the counter and return the new total
    pub fn record(&mut self, hash: OrderHash, amount: u128) -> u128 {
        let total = self.filled.entry(hash).or_insert(0);
        *total = total.saturating_add(amount);
        *total
    }

    /// Number of orders with a non-zero fill
    pub fn len(&self) -> usize {
        self.filled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filled.is_empty()
    }
}
