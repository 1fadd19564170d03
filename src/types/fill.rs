//! Fill type recording one settlement step against a maker order.
//!
//! ## SSZ Serialization
//!
//! Fills are serialized with SSZ so the receipt's fill root is identical for
//! identical settlement runs.

use alloy_primitives::{Address, B256};
use ssz_rs::prelude::*;

use crate::types::{Outcome, Side};

/// One incremental fill of a maker order by a taker.
///
/// ## Legs
///
/// A fill of `amount` shares splits into two parts:
///
/// - `shares_transferred`: outcome shares the seller already held and
///   delivered to the buyer, paid for at the order price.
/// - `shares_minted`: new complete sets; the buyer keeps the order's
///   outcome, the seller receives the complement, and the market's
///   collateral account receives `shares_minted` cash.
///
/// All cash figures are fixed-point (10^18 scale).
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Fill {
    /// Sequence number assigned by the engine
    pub id: u64,

    /// Hash of the order this fill consumed
    pub order_hash: [u8; 32],

    pub maker: [u8; 20],
    pub taker: [u8; 20],
    pub market: [u8; 20],

    /// Outcome as u8 (0=No, 1=Yes)
    pub outcome_raw: u8,

    /// Maker side as u8 (0=Bid, 1=Ask)
    pub maker_side_raw: u8,

    /// Order price in ticks
    pub price: u64,

    /// Shares filled in this step
    pub amount: u128,

    pub shares_transferred: u128,
    pub shares_minted: u128,

    pub maker_cash_paid: u128,
    pub maker_cash_received: u128,
    pub taker_cash_paid: u128,
    pub taker_cash_received: u128,

    /// Requested amount still unfilled after this step
    pub remaining_after: u128,

    /// Caller-supplied grouping id, echoed for indexers
    pub trade_group_id: [u8; 32],

    pub affiliate: [u8; 20],

    /// True when the taker's debits were drawn from an exit claim
    pub via_exit: bool,
}

impl Fill {
    pub fn order_hash(&self) -> B256 {
        B256::from(self.order_hash)
    }

    pub fn maker(&self) -> Address {
        Address::from(self.maker)
    }

    pub fn taker(&self) -> Address {
        Address::from(self.taker)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        Outcome::from_u8(self.outcome_raw)
    }

    pub fn maker_side(&self) -> Option<Side> {
        Side::from_u8(self.maker_side_raw)
    }

    /// Net cash the maker parted with (paid minus received)
    ///
    /// `None` when either side does not fit an `i128`.
    pub fn maker_net_cash(&self) -> Option<i128> {
        net(self.maker_cash_paid, self.maker_cash_received)
    }

    /// Net cash the taker parted with (paid minus received)
    pub fn taker_net_cash(&self) -> Option<i128> {
        net(self.taker_cash_paid, self.taker_cash_received)
    }
}

fn net(paid: u128, received: u128) -> Option<i128> {
    i128::try_from(paid)
        .ok()?
        .checked_sub(i128::try_from(received).ok()?)
}

// ============================================================================
// Unit Tests
// ============================================================================
