//! # Exit Settlement
//!
//! Settlement of maker-signed orders on binary prediction markets, with
//! exit escrow.
//!
//! ## Architecture
//!
//! - **Types**: Order, Fill, SettlementReceipt and fixed-point amounts
//! - **Codec**: canonical order bytes and domain-separated hashing
//! - **Signature**: maker recovery under the supported signing schemes
//! - **Exit**: escrowed claims that a taker can trade out of
//! - **Engine**: deterministic fill settlement against an asset ledger
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical state and input give identical fills
//! 2. **No Floating Point**: amounts are `u128` scaled by 10^18
//! 3. **No Double Spend**: an order never fills past its size and an exit
//!    never pays out more than it holds
//! 4. **Synchronous Execution**: no async in the settlement path

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Fill, SettlementReceipt
pub mod types;

/// Canonical order encoding and hashing
pub mod codec;

/// Maker signature parsing and verification
pub mod signature;

/// External asset ledger interface
pub mod ledger;

/// Exit claims and their registry
pub mod exit;

/// Settlement engine
pub mod engine;

pub mod config;
pub mod error;
pub mod logging;

#[cfg(feature = "testkit")]
pub mod testkit;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use codec::OrderCodec;
pub use config::SettlementConfig;
pub use engine::{SettlementEngine, SharedSettlement, TradeOutcome, TradeRequest};
pub use error::{Result, SettlementError, SkipReason};
pub use exit::{ExitBalances, ExitId, ExitRegistry};
pub use ledger::{Asset, AssetLedger, InMemoryLedger};
pub use signature::{OrderSignature, SignatureScheme, SignatureVerifier};
pub use types::{Fill, Order, Outcome, SettlementReceipt, Side};
