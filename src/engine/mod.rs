//! Settlement engine.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: same state and request always give the same fills
//! 2. **Fixed-Point Math**: no floating point, rounding favours the maker
//! 3. **Two Phases**: pure preparation, then serialised mutation
//! 4. **Caller Priority**: orders are tried in the sequence supplied
//!
//! ## Settlement Rules
//!
//! - The seller delivers held shares first; the rest is minted as complete
//!   sets funded by both parties
//! - A taker trading through an exit claim pays only out of that claim
//! - Proceeds always land on the free ledger
//! - An order never fills past its signed amount
//!
//! ## Example
//!
//! ```
//! use alloy_primitives::Address;
//! use exit_settlement::config::SettlementConfig;
//! use exit_settlement::engine::{SettlementEngine, TradeRequest};
//! use exit_settlement::ledger::{Asset, AssetLedger, InMemoryLedger};
//!
//! let market = Address::repeat_byte(0x11);
//! let trader = Address::repeat_byte(0xA1);
//!
//! let mut ledger = InMemoryLedger::new();
//! ledger.credit(trader, Asset::Cash, 500).unwrap();
//!
//! let mut engine = SettlementEngine::new(&SettlementConfig::default(), ledger);
//! let exit_id = engine.initialize_for_exit(market, trader).unwrap();
//!
//! assert_eq!(engine.lookup_exit(exit_id).unwrap().cash, 500);
//! assert_eq!(engine.ledger().balance_of(trader, Asset::Cash), 0);
//!
//! let request = TradeRequest::new(10, trader).with_exit(exit_id);
//! assert_eq!(engine.trade(request).unwrap(), 10);
//! ```

mod clock;
mod fills;
pub mod math;
mod request;
mod settlement;
mod shared;
mod target;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fills::FillTracker;
pub use request::{SkippedOrder, TradeOutcome, TradeRequest};
pub use settlement::{BatchPreparer, PreparedBatch, PreparedOrder, SettlementEngine};
pub use shared::SharedSettlement;
pub use target::{Books, Credits, EscrowTarget, FreeBalanceTarget, PartyDebit, SettlementTarget};
