//! Core data types for the settlement engine
//!
//! Records that cross a hashing or receipt boundary derive SSZ
//! `SimpleSerialize` so their byte encoding is deterministic.
//!
//! ## Types
//!
//! - [`Order`]: A maker-signed limit order on one outcome
//! - [`Side`]: Bid or Ask (maker's perspective)
//! - [`Outcome`]: Yes or No
//! - [`Fill`]: One settlement step against an order
//! - [`SettlementReceipt`]: Summary of a `trade` call
//!
//! ## Fixed-Point Arithmetic
//!
//! Amounts are `u128` scaled by 10^18; see [`amount`].

mod order;
mod fill;
mod receipt;
pub mod amount;

pub use order::{Order, Outcome, Side, ORDER_ENCODED_LEN};
pub use fill::Fill;
pub use receipt::SettlementReceipt;

/// Key for cumulative-fill tracking and the message a maker signs
pub type OrderHash = alloy_primitives::B256;
