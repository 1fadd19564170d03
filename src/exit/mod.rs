//! Exit escrow.
//!
//! An exit earmarks a participant's position in one market: at creation the
//! participant's cash and outcome shares move off the free ledger into an
//! [`ExitClaim`]. Trades that name the exit draw the taker's legs from the
//! claim instead of the free balance. Claim balances only ever decrease
//! after creation.
//!
//! ## Components
//!
//! - [`ExitId`]: `keccak256(market || participant)`
//! - [`ExitBalances`]: escrowed `(shares[No, Yes], cash)`
//! - [`ExitClaim`]: one participant's claim on one market
//! - [`ExitRegistry`]: slab-backed claim arena indexed by id

use std::fmt;

use alloy_primitives::{Address, Keccak256, B256};

use crate::types::Outcome;

pub mod registry;

pub use registry::ExitRegistry;

/// Deterministic identifier of an exit claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExitId(pub B256);

impl ExitId {
    pub const ZERO: ExitId = ExitId(B256::ZERO);

    /// Id for `participant`'s exit from `market`
    pub fn derive(market: Address, participant: Address) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(market);
        hasher.update(participant);
        ExitId(hasher.finalize())
    }
}

impl fmt::Display for ExitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Escrowed balances, also used as a debit delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitBalances {
    /// Shares indexed by [`Outcome::index`]
    pub shares: [u128; 2],
    pub cash: u128,
}

impl ExitBalances {
    pub fn new(no_shares: u128, yes_shares: u128, cash: u128) -> Self {
        Self { shares: [no_shares, yes_shares], cash }
    }

    pub fn cash(cash: u128) -> Self {
        Self { shares: [0, 0], cash }
    }

    #[inline]
    pub fn share(&self, outcome: Outcome) -> u128 {
        self.shares[outcome.index()]
    }

    pub fn is_zero(&self) -> bool {
        self.cash == 0 && self.shares == [0, 0]
    }

    /// Component-wise subtraction; `None` if any component would underflow
    pub fn checked_sub(&self, delta: &ExitBalances) -> Option<ExitBalances> {
        Some(ExitBalances {
            shares: [
                self.shares[0].checked_sub(delta.shares[0])?,
                self.shares[1].checked_sub(delta.shares[1])?,
            ],
            cash: self.cash.checked_sub(delta.cash)?,
        })
    }
}

/// One participant's escrow on one market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitClaim {
    pub id: ExitId,
    pub market: Address,
    pub participant: Address,
    pub balances: ExitBalances,
}
