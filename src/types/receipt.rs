//! Settlement receipt summarising one `trade` call.
//!
//! The receipt carries a SHA-256 fill root over the SSZ encodings of every
//! fill in the call, so two runs over identical inputs can be compared by a
//! single 32-byte value.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::types::Fill;

/// Summary of a settlement call.
///
/// ## Example
///
/// ```
/// use exit_settlement::types::SettlementReceipt;
///
/// let receipt = SettlementReceipt::from_fills(1, 3, &[], 500, 1_700_000_000);
/// assert!(receipt.is_empty());
/// assert_eq!(receipt.remaining, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct SettlementReceipt {
    /// Engine-assigned sequence number of the trade call
    pub batch_id: u64,

    /// Orders supplied by the caller
    pub orders_supplied: u64,

    /// Fills executed (skipped orders produce none)
    pub fills_executed: u64,

    /// SHA-256 over the concatenated SSZ encodings of the fills
    pub fill_root: [u8; 32],

    /// Requested amount left unfilled
    pub remaining: u128,

    /// Clock reading (unix seconds) the call was evaluated at
    pub timestamp: u64,
}

impl SettlementReceipt {
    /// Build a receipt, hashing the supplied fills into the fill root
    pub fn from_fills(
        batch_id: u64,
        orders_supplied: u64,
        fills: &[Fill],
        remaining: u128,
        timestamp: u64,
    ) -> Self {
        Self {
            batch_id,
            orders_supplied,
            fills_executed: fills.len() as u64,
            fill_root: Self::compute_fill_root(fills),
            remaining,
            timestamp,
        }
    }

    /// SHA-256 over the fills in settlement order
    ///
    /// A fill that fails to serialize contributes nothing; fixed-size
    /// containers cannot fail in practice.
    pub fn compute_fill_root(fills: &[Fill]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for fill in fills {
            if let Ok(bytes) = ssz_rs::serialize(fill) {
                hasher.update(&bytes);
            }
        }
        let result = hasher.finalize();

        let mut root = [0u8; 32];
        root.copy_from_slice(&result);
        root
    }

    pub fn fill_root_hex(&self) -> String {
        hex::encode(self.fill_root)
    }

    /// True when no order was filled
    pub fn is_empty(&self) -> bool {
        self.fills_executed == 0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
