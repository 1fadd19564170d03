//! Settlement engine.
//!
//! ## Phases
//!
//! 1. **Prepare** (pure): decode every order, hash it, verify its signature.
//!    A malformed order aborts here, before anything is mutated.
//! 2. **Apply** (critical section): walk the prepared orders in caller
//!    order, skip the ones that cannot be filled, and settle the rest until
//!    the requested amount is exhausted.
//!
//! ## Per-order checks (skip, never abort)
//!
//! signature → exchange → expiration → KYC → self-trade → exit market →
//! remaining size
//!
//! ## Fatal conditions
//!
//! Malformed order bytes, signature count mismatch, unknown or foreign
//! exit, insufficient escrow, insufficient free balance. A fatal error in
//! step `k` leaves steps `0..k` applied and step `k` untouched.

use alloy_primitives::{Address, B256};
use tracing::{debug, info, warn};

use crate::codec::OrderCodec;
use crate::config::SettlementConfig;
use crate::engine::clock::{Clock, SystemClock};
use crate::engine::fills::FillTracker;
use crate::engine::math::plan_fill;
use crate::engine::request::{SkippedOrder, TradeOutcome, TradeRequest};
use crate::engine::target::{
    Books, Credits, EscrowTarget, FreeBalanceTarget, PartyDebit, SettlementTarget,
};
use crate::error::{CodecError, ExitError, Result, SettlementError, SkipReason};
use crate::exit::{ExitBalances, ExitId, ExitRegistry};
use crate::ledger::{Asset, AssetLedger};
use crate::signature::SignatureVerifier;
use crate::types::{Fill, Order, OrderHash, SettlementReceipt, Side};

// ============================================================================
// Prepare phase
// ============================================================================

/// An order that decoded cleanly, with its hash and signature verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedOrder {
    pub index: usize,
    pub order: Order,
    pub hash: OrderHash,
    pub signature_valid: bool,
}

/// A request whose orders have all been decoded and authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBatch {
    pub fill_amount: u128,
    pub affiliate: Address,
    pub trade_group_id: B256,
    pub taker: Address,
    pub exit: Option<ExitId>,
    pub orders: Vec<PreparedOrder>,
}

/// Decoding and signature checks; holds no mutable state.
#[derive(Debug, Clone)]
pub struct BatchPreparer {
    codec: OrderCodec,
    verifier: SignatureVerifier,
}

impl BatchPreparer {
    pub fn new(codec: OrderCodec, verifier: SignatureVerifier) -> Self {
        Self { codec, verifier }
    }

    pub fn codec(&self) -> &OrderCodec {
        &self.codec
    }

    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    /// Decode and authenticate every order in the request
    ///
    /// # Errors
    ///
    /// - `SignatureCountMismatch` when orders and signatures are not paired
    /// - `MalformedOrder` for the first order that fails to decode
    pub fn prepare(&self, request: TradeRequest) -> Result<PreparedBatch> {
        if request.orders.len() != request.signatures.len() {
            return Err(SettlementError::SignatureCountMismatch {
                orders: request.orders.len(),
                signatures: request.signatures.len(),
            });
        }

        let mut orders = Vec::with_capacity(request.orders.len());
        for (index, (bytes, signature)) in
            request.orders.iter().zip(request.signatures.iter()).enumerate()
        {
            let malformed = |source| SettlementError::MalformedOrder { index, source };

            let order = self.codec.decode(bytes).map_err(malformed)?;
            let hash = self.codec.hash_for_exchange(&order).map_err(malformed)?;
            let signature_valid = self.verifier.verify(&hash, order.maker(), signature);

            orders.push(PreparedOrder {
                index,
                order,
                hash,
                signature_valid,
            });
        }

        Ok(PreparedBatch {
            fill_amount: request.fill_amount,
            affiliate: request.affiliate,
            trade_group_id: request.trade_group_id,
            taker: request.taker,
            exit: request.exit,
            orders,
        })
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Serialising settlement authority.
///
/// Owns the cumulative-fill counters and the exit registry, and drives an
/// external [`AssetLedger`]. All mutation goes through `&mut self`, so one
/// engine value is one critical section; wrap it in
/// [`crate::engine::SharedSettlement`] to share it between threads.
///
/// ## Example
///
/// ```
/// use alloy_primitives::Address;
/// use exit_settlement::config::SettlementConfig;
/// use exit_settlement::engine::{SettlementEngine, TradeRequest};
/// use exit_settlement::ledger::InMemoryLedger;
///
/// let mut engine = SettlementEngine::new(&SettlementConfig::default(), InMemoryLedger::new());
///
/// // Nothing to fill against: the whole request comes back
/// let remaining = engine.trade(TradeRequest::new(500, Address::repeat_byte(0xB0))).unwrap();
/// assert_eq!(remaining, 500);
/// ```
#[derive(Debug)]
pub struct SettlementEngine<L: AssetLedger> {
    preparer: BatchPreparer,
    exchange: Address,
    ledger: L,
    exits: ExitRegistry,
    fills: FillTracker,
    clock: Box<dyn Clock>,
    next_batch_id: u64,
    next_fill_id: u64,
}

impl<L: AssetLedger> SettlementEngine<L> {
    /// Engine on the wall clock
    pub fn new(config: &SettlementConfig, ledger: L) -> Self {
        Self {
            preparer: BatchPreparer::new(config.codec(), config.verifier()),
            exchange: config.exchange,
            ledger,
            exits: ExitRegistry::new(),
            fills: FillTracker::new(),
            clock: Box::new(SystemClock),
            next_batch_id: 1,
            next_fill_id: 1,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn preparer(&self) -> &BatchPreparer {
        &self.preparer
    }

    pub fn codec(&self) -> &OrderCodec {
        self.preparer.codec()
    }

    pub fn exchange(&self) -> Address {
        self.exchange
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn exits(&self) -> &ExitRegistry {
        &self.exits
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Hash a maker would sign for `order`
    pub fn order_hash(&self, order: &Order) -> Result<OrderHash, CodecError> {
        self.codec().hash_for_exchange(order)
    }

    /// Cumulative amount filled on an order hash
    pub fn filled_amount(&self, hash: &OrderHash) -> u128 {
        self.fills.filled(hash)
    }

    // ========================================================================
    // Exits
    // ========================================================================

    /// Escrow `participant`'s position on `market`
    pub fn initialize_for_exit(
        &mut self,
        market: Address,
        participant: Address,
    ) -> Result<ExitId, ExitError> {
        self.exits.initialize_for_exit(&mut self.ledger, market, participant)
    }

    pub fn lookup_exit(&self, exit_id: ExitId) -> Result<ExitBalances, ExitError> {
        self.exits.lookup_exit(exit_id)
    }

    // ========================================================================
    // Trading
    // ========================================================================

    /// Settle a request and return the unfilled remainder
    pub fn trade(&mut self, request: TradeRequest) -> Result<u128> {
        self.settle(request).map(|outcome| outcome.remaining)
    }

    /// Settle a request and return fills, skips and the receipt
    pub fn settle(&mut self, request: TradeRequest) -> Result<TradeOutcome> {
        let batch = match self.preparer.prepare(request) {
            Ok(batch) => batch,
            Err(err) => {
                warn!(%err, "trade rejected");
                return Err(err);
            }
        };
        self.apply(batch)
    }

    /// Run the mutation phase for an already prepared batch
    pub fn apply(&mut self, batch: PreparedBatch) -> Result<TradeOutcome> {
        let result = self.apply_inner(batch);
        if let Err(err) = &result {
            warn!(%err, "trade aborted");
        }
        result
    }

    fn apply_inner(&mut self, batch: PreparedBatch) -> Result<TradeOutcome> {
        let taker = batch.taker;

        let (taker_target, exit_market): (Box<dyn SettlementTarget>, Option<Address>) =
            match batch.exit {
                Some(exit_id) => {
                    let claim = self
                        .exits
                        .claim(exit_id)
                        .ok_or(ExitError::UnknownExit(exit_id))?;
                    if claim.participant != taker {
                        return Err(ExitError::Unauthorized { exit_id, caller: taker }.into());
                    }
                    (Box::new(EscrowTarget::new(exit_id)), Some(claim.market))
                }
                None => (Box::new(FreeBalanceTarget), None),
            };

        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;

        let now = self.clock.now();
        let orders_supplied = batch.orders.len() as u64;
        let mut remaining = batch.fill_amount;
        let mut fills = Vec::new();
        let mut skipped = Vec::new();

        info!(
            batch_id,
            %taker,
            fill_amount = batch.fill_amount,
            orders = orders_supplied,
            exit = batch.exit.map(|id| id.to_string()),
            "settling trade"
        );

        for prepared in &batch.orders {
            if remaining == 0 {
                break;
            }

            let skip = self.skip_reason(prepared, taker, exit_market, now).or_else(|| {
                (self.fills.unfilled(&prepared.hash, prepared.order.amount) == 0)
                    .then_some(SkipReason::FullyFilled)
            });
            if let Some(reason) = skip {
                debug!(index = prepared.index, order_hash = %prepared.hash, %reason, "order skipped");
                skipped.push(SkippedOrder {
                    index: prepared.index,
                    order_hash: prepared.hash,
                    reason,
                });
                continue;
            }

            let amount = remaining.min(self.fills.unfilled(&prepared.hash, prepared.order.amount));
            let mut fill = self.settle_step(prepared, amount, &batch, taker_target.as_ref())?;

            self.fills.record(prepared.hash, amount);
            remaining -= amount;
            fill.remaining_after = remaining;

            info!(
                fill_id = fill.id,
                order_hash = %prepared.hash,
                maker = %prepared.order.maker(),
                amount,
                minted = fill.shares_minted,
                transferred = fill.shares_transferred,
                remaining,
                "order filled"
            );
            fills.push(fill);
        }

        let receipt =
            SettlementReceipt::from_fills(batch_id, orders_supplied, &fills, remaining, now);
        info!(
            batch_id,
            fills = fills.len(),
            skipped = skipped.len(),
            remaining,
            fill_root = %receipt.fill_root_hex(),
            "trade settled"
        );

        Ok(TradeOutcome {
            remaining,
            fills,
            skipped,
            receipt,
        })
    }

    /// First reason the order cannot be filled by `taker`, if any
    fn skip_reason(
        &self,
        prepared: &PreparedOrder,
        taker: Address,
        exit_market: Option<Address>,
        now: u64,
    ) -> Option<SkipReason> {
        let order = &prepared.order;

        if !prepared.signature_valid {
            return Some(SkipReason::InvalidSignature);
        }
        if order.exchange() != self.exchange {
            return Some(SkipReason::ForeignExchange);
        }
        if order.is_expired(now) {
            return Some(SkipReason::ExpiredOrder);
        }
        if let Some(token) = order.kyc_restriction() {
            if self.ledger.balance_of(taker, Asset::Token(token)) == 0 {
                return Some(SkipReason::KycRestricted);
            }
        }
        if order.maker() == taker {
            return Some(SkipReason::SelfTrade);
        }
        if exit_market.is_some_and(|market| market != order.market()) {
            return Some(SkipReason::MarketMismatch);
        }
        None
    }

    /// Move funds for one order; both parties' debits are checked first
    fn settle_step(
        &mut self,
        prepared: &PreparedOrder,
        amount: u128,
        batch: &PreparedBatch,
        taker_target: &dyn SettlementTarget,
    ) -> Result<Fill> {
        let order = &prepared.order;
        let index = prepared.index;
        let malformed = |source| SettlementError::MalformedOrder { index, source };

        let side = order.side().ok_or(CodecError::InvalidSide(order.side_raw)).map_err(malformed)?;
        let outcome = order
            .outcome()
            .ok_or(CodecError::InvalidOutcome(order.outcome_raw))
            .map_err(malformed)?;
        let market = order.market();
        let maker = order.maker();
        let taker = batch.taker;
        let num_ticks = self.preparer.codec().num_ticks();

        let maker_target = FreeBalanceTarget;
        let mut books = Books {
            ledger: &mut self.ledger,
            exits: &mut self.exits,
        };

        let seller_shares = match side {
            Side::Bid => taker_target.share_balance(&books, taker, market, outcome),
            Side::Ask => maker_target.share_balance(&books, maker, market, outcome),
        };

        let plan = plan_fill(side, outcome, order.price, num_ticks, amount, seller_shares)
            .ok_or(SettlementError::Overflow { index })?;

        let maker_debit = PartyDebit::from_legs(market, &plan.maker);
        let taker_debit = PartyDebit::from_legs(market, &plan.taker);

        let mut credits = Credits::new();
        credits.add_legs(maker, market, &plan.maker)?;
        credits.add_legs(taker, market, &plan.taker)?;
        credits.add(market, Asset::Cash, plan.collateral)?;

        // Every leg of the step is checked before anything moves
        maker_target.ensure(&books, maker, &maker_debit)?;
        taker_target.ensure(&books, taker, &taker_debit)?;
        credits.ensure(&*books.ledger)?;

        maker_target.withdraw(&mut books, maker, &maker_debit)?;
        taker_target.withdraw(&mut books, taker, &taker_debit)?;
        credits.apply(books.ledger)?;

        let id = self.next_fill_id;
        self.next_fill_id += 1;

        Ok(Fill {
            id,
            order_hash: prepared.hash.0,
            maker: order.maker,
            taker: taker.0 .0,
            market: order.market,
            outcome_raw: order.outcome_raw,
            maker_side_raw: order.side_raw,
            price: order.price,
            amount,
            shares_transferred: plan.transferred,
            shares_minted: plan.minted,
            maker_cash_paid: plan.maker.cash_out,
            maker_cash_received: plan.maker.cash_in,
            taker_cash_paid: plan.taker.cash_out,
            taker_cash_received: plan.taker.cash_in,
            remaining_after: 0,
            trade_group_id: batch.trade_group_id.0,
            affiliate: batch.affiliate.0 .0,
            via_exit: taker_target.is_escrow(),
        })
    }
}
