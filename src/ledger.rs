//! External fungible-asset ledger seam.
//!
//! The engine never owns balances itself: every non-escrowed leg of a fill
//! is a `debit` or `credit` on an [`AssetLedger`]. [`InMemoryLedger`] is the
//! reference implementation used by the binary, the tests and benchmarks.

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::Address;

use crate::error::LedgerError;
use crate::types::Outcome;

/// Asset classes the settlement engine moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    /// Settlement cash (fixed-point, 10^18 scale)
    Cash,
    /// Outcome shares of one market
    Share { market: Address, outcome: Outcome },
    /// Any other token, e.g. a KYC pass
    Token(Address),
}

impl Asset {
    pub fn share(market: Address, outcome: Outcome) -> Self {
        Asset::Share { market, outcome }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Cash => write!(f, "cash"),
            Asset::Share { market, outcome } => write!(f, "{:?} shares of {}", outcome, market),
            Asset::Token(token) => write!(f, "token {}", token),
        }
    }
}

/// Fungible-asset account service.
///
/// `debit` must be all-or-nothing: on `InsufficientBalance` nothing moves.
pub trait AssetLedger {
    fn balance_of(&self, account: Address, asset: Asset) -> u128;

    fn credit(&mut self, account: Address, asset: Asset, amount: u128) -> Result<(), LedgerError>;

    fn debit(&mut self, account: Address, asset: Asset, amount: u128) -> Result<(), LedgerError>;

    /// Fail with `InsufficientBalance` unless `amount` could be debited
    fn ensure_available(
        &self,
        account: Address,
        asset: Asset,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(account, asset);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account,
                asset,
                available,
                required: amount,
            });
        }
        Ok(())
    }

    /// Fail with `Overflow` unless `amount` could be credited
    fn ensure_credit(
        &self,
        account: Address,
        asset: Asset,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.balance_of(account, asset)
            .checked_add(amount)
            .map(|_| ())
            .ok_or(LedgerError::Overflow { account, asset })
    }
}

/// HashMap-backed ledger.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    balances: HashMap<(Address, Asset), u128>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of one asset across all accounts
    pub fn total_supply(&self, asset: Asset) -> u128 {
        self.balances
            .iter()
            .filter(|((_, a), _)| *a == asset)
            .map(|(_, amount)| *amount)
            .sum()
    }

    /// Number of non-zero balances held
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl AssetLedger for InMemoryLedger {
    fn balance_of(&self, account: Address, asset: Asset) -> u128 {
        self.balances.get(&(account, asset)).copied().unwrap_or(0)
    }

    fn credit(&mut self, account: Address, asset: Asset, amount: u128) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.balances.entry((account, asset)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account, asset })?;
        Ok(())
    }

    fn debit(&mut self, account: Address, asset: Asset, amount: u128) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        self.ensure_available(account, asset, amount)?;

        let key = (account, asset);
        let remaining = self.balance_of(account, asset) - amount;
        if remaining == 0 {
            self.balances.remove(&key);
        } else {
            self.balances.insert(key, remaining);
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
