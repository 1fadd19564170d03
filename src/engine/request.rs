//! Inputs and outputs of a `trade` call.

use alloy_primitives::{Address, B256};

use crate::error::SkipReason;
use crate::exit::ExitId;
use crate::types::{Fill, OrderHash, SettlementReceipt};

/// A taker's request to consume signed maker orders.
///
/// `orders[i]` is paired with `signatures[i]`; orders are tried in the
/// supplied sequence, which decides priority when `fill_amount` is scarce.
///
/// ```
/// use alloy_primitives::{Address, B256};
/// use exit_settlement::engine::TradeRequest;
///
/// let request = TradeRequest::new(1_000, Address::repeat_byte(0xB0))
///     .with_trade_group(B256::with_last_byte(42))
///     .with_order(vec![0u8; 122], vec![0u8; 66]);
/// assert_eq!(request.orders.len(), 1);
/// assert!(request.exit.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRequest {
    /// Shares the taker wants filled
    pub fill_amount: u128,
    pub affiliate: Address,
    pub trade_group_id: B256,
    /// Encoded orders (see [`crate::codec::OrderCodec`])
    pub orders: Vec<Vec<u8>>,
    /// Wire signatures (see [`crate::signature::OrderSignature`])
    pub signatures: Vec<Vec<u8>>,
    pub taker: Address,
    /// Draw the taker's debits from this exit claim
    pub exit: Option<ExitId>,
}

impl TradeRequest {
    pub fn new(fill_amount: u128, taker: Address) -> Self {
        Self {
            fill_amount,
            affiliate: Address::ZERO,
            trade_group_id: B256::ZERO,
            orders: Vec::new(),
            signatures: Vec::new(),
            taker,
            exit: None,
        }
    }

    pub fn with_order(mut self, order: Vec<u8>, signature: Vec<u8>) -> Self {
        self.orders.push(order);
        self.signatures.push(signature);
        self
    }

    pub fn with_orders(mut self, orders: Vec<Vec<u8>>, signatures: Vec<Vec<u8>>) -> Self {
        self.orders = orders;
        self.signatures = signatures;
        self
    }

    pub fn with_affiliate(mut self, affiliate: Address) -> Self {
        self.affiliate = affiliate;
        self
    }

    pub fn with_trade_group(mut self, trade_group_id: B256) -> Self {
        self.trade_group_id = trade_group_id;
        self
    }

    pub fn with_exit(mut self, exit: ExitId) -> Self {
        self.exit = Some(exit);
        self
    }
}

/// An order passed over without failing the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedOrder {
    /// Position in the request
    pub index: usize,
    pub order_hash: OrderHash,
    pub reason: SkipReason,
}

/// Result of a settled `trade` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOutcome {
    /// Requested amount left unfilled; zero means fully filled
    pub remaining: u128,
    pub fills: Vec<Fill>,
    pub skipped: Vec<SkippedOrder>,
    pub receipt: SettlementReceipt,
}

impl TradeOutcome {
    /// Total shares filled across all orders
    pub fn filled(&self) -> u128 {
        self.fills.iter().map(|fill| fill.amount).sum()
    }

    pub fn skip_reasons(&self) -> Vec<SkipReason> {
        self.skipped.iter().map(|skip| skip.reason).collect()
    }
}
