//! Where a party's outgoing legs are drawn from.
//!
//! The matching loop never branches on "exit mode": it asks a
//! [`SettlementTarget`] for the seller's deliverable shares, checks the
//! party's debit against it, and then withdraws. Makers always settle
//! against [`FreeBalanceTarget`]; a taker settles against
//! [`EscrowTarget`] when the trade names an exit. Credits always land on
//! the free ledger and are collected in [`Credits`].

use std::fmt;

use alloy_primitives::Address;

use crate::engine::math::PartyLegs;
use crate::error::{LedgerError, SettlementError};
use crate::exit::{ExitBalances, ExitId, ExitRegistry};
use crate::ledger::{Asset, AssetLedger};
use crate::types::Outcome;

/// Mutable view of every balance store a fill can touch.
pub struct Books<'a> {
    pub ledger: &'a mut dyn AssetLedger,
    pub exits: &'a mut ExitRegistry,
}

/// Outgoing amounts of one party in one fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyDebit {
    pub market: Address,
    pub cash: u128,
    /// Shares indexed by [`Outcome::index`]
    pub shares: [u128; 2],
}

impl PartyDebit {
    pub fn from_legs(market: Address, legs: &PartyLegs) -> Self {
        Self {
            market,
            cash: legs.cash_out,
            shares: legs.shares_out,
        }
    }

    fn legs(&self) -> impl Iterator<Item = (Asset, u128)> + '_ {
        let shares = Outcome::ALL
            .into_iter()
            .map(move |outcome| (Asset::share(self.market, outcome), self.shares[outcome.index()]));
        std::iter::once((Asset::Cash, self.cash))
            .chain(shares)
            .filter(|(_, amount)| *amount > 0)
    }
}

/// Source of a party's debits.
pub trait SettlementTarget: fmt::Debug {
    /// Shares of `outcome` the party could deliver instead of minting
    fn share_balance(
        &self,
        books: &Books<'_>,
        account: Address,
        market: Address,
        outcome: Outcome,
    ) -> u128;

    /// Fail unless the whole debit can be taken; never mutates
    fn ensure(&self, books: &Books<'_>, account: Address, debit: &PartyDebit)
        -> Result<(), SettlementError>;

    /// Take the debit
    fn withdraw(
        &self,
        books: &mut Books<'_>,
        account: Address,
        debit: &PartyDebit,
    ) -> Result<(), SettlementError>;

    /// True when debits come out of an exit claim
    fn is_escrow(&self) -> bool {
        false
    }
}

// ============================================================================
// Free balance
// ============================================================================

/// Debits the party's free balance on the external ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeBalanceTarget;

impl SettlementTarget for FreeBalanceTarget {
    fn share_balance(
        &self,
        books: &Books<'_>,
        account: Address,
        market: Address,
        outcome: Outcome,
    ) -> u128 {
        books.ledger.balance_of(account, Asset::share(market, outcome))
    }

    fn ensure(
        &self,
        books: &Books<'_>,
        account: Address,
        debit: &PartyDebit,
    ) -> Result<(), SettlementError> {
        for (asset, amount) in debit.legs() {
            books.ledger.ensure_available(account, asset, amount)?;
        }
        Ok(())
    }

    fn withdraw(
        &self,
        books: &mut Books<'_>,
        account: Address,
        debit: &PartyDebit,
    ) -> Result<(), SettlementError> {
        self.ensure(books, account, debit)?;
        for (asset, amount) in debit.legs() {
            books.ledger.debit(account, asset, amount)?;
        }
        Ok(())
    }
}

// ============================================================================
// Exit escrow
// ============================================================================

/// Debits an exit claim owned by the party.
#[derive(Debug, Clone, Copy)]
pub struct EscrowTarget {
    exit_id: ExitId,
}

impl EscrowTarget {
    pub fn new(exit_id: ExitId) -> Self {
        Self { exit_id }
    }

    fn delta(debit: &PartyDebit) -> ExitBalances {
        ExitBalances {
            shares: debit.shares,
            cash: debit.cash,
        }
    }
}

impl SettlementTarget for EscrowTarget {
    fn share_balance(
        &self,
        books: &Books<'_>,
        _account: Address,
        market: Address,
        outcome: Outcome,
    ) -> u128 {
        books
            .exits
            .claim(self.exit_id)
            .filter(|claim| claim.market == market)
            .map(|claim| claim.balances.share(outcome))
            .unwrap_or(0)
    }

    fn ensure(
        &self,
        books: &Books<'_>,
        _account: Address,
        debit: &PartyDebit,
    ) -> Result<(), SettlementError> {
        books.exits.ensure_debit(self.exit_id, &Self::delta(debit))?;
        Ok(())
    }

    fn withdraw(
        &self,
        books: &mut Books<'_>,
        _account: Address,
        debit: &PartyDebit,
    ) -> Result<(), SettlementError> {
        books.exits.debit(self.exit_id, &Self::delta(debit))?;
        Ok(())
    }

    fn is_escrow(&self) -> bool {
        true
    }
}

// ============================================================================
// Credits
// ============================================================================

/// Incoming legs of one fill, merged per account and asset.
///
/// Credits are checked against the ledger before any debit of the step is
/// taken, so an overflowing credit aborts the step with nothing moved.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Credits {
    entries: Vec<(Address, Asset, u128)>,
}

impl Credits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        account: Address,
        asset: Asset,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        match self
            .entries
            .iter_mut()
            .find(|(owner, held, _)| *owner == account && *held == asset)
        {
            Some((_, _, total)) => {
                *total = total
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow { account, asset })?;
            }
            None => self.entries.push((account, asset, amount)),
        }
        Ok(())
    }

    /// Add a party's cash and share receipts
    pub fn add_legs(
        &mut self,
        account: Address,
        market: Address,
        legs: &PartyLegs,
    ) -> Result<(), LedgerError> {
        self.add(account, Asset::Cash, legs.cash_in)?;
        for outcome in Outcome::ALL {
            self.add(account, Asset::share(market, outcome), legs.shares_in[outcome.index()])?;
        }
        Ok(())
    }

    /// Total pending for one account and asset
    pub fn amount(&self, account: Address, asset: Asset) -> u128 {
        self.entries
            .iter()
            .find(|(owner, held, _)| *owner == account && *held == asset)
            .map_or(0, |(_, _, total)| *total)
    }

    /// Fail unless every credit fits; never mutates
    pub fn ensure(&self, ledger: &dyn AssetLedger) -> Result<(), LedgerError> {
        for (account, asset, amount) in &self.entries {
            ledger.ensure_credit(*account, *asset, *amount)?;
        }
        Ok(())
    }

    pub fn apply(&self, ledger: &mut dyn AssetLedger) -> Result<(), LedgerError> {
        for (account, asset, amount) in &self.entries {
            ledger.credit(*account, *asset, *amount)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;

    const MARKET: Address = Address::repeat_byte(0x11);
    const ALICE: Address = Address::repeat_byte(0xA1);

    fn debit(cash: u128, yes: u128) -> PartyDebit {
        PartyDebit {
            market: MARKET,
            cash,
            shares: [0, yes],
        }
    }

    #[test]
    fn test_free_balance_checks_every_leg() {
        let mut ledger = InMemoryLedger::new();
        ledger.credit(ALICE, Asset::Cash, 100).unwrap();
        let mut exits = ExitRegistry::new();
        let mut books = Books { ledger: &mut ledger, exits: &mut exits };

        let target = FreeBalanceTarget;
        assert!(target.ensure(&books, ALICE, &debit(100, 0)).is_ok());

        // Cash is fine but shares are missing: nothing is debited
        let err = target.withdraw(&mut books, ALICE, &debit(50, 1)).unwrap_err();
        assert!(err.is_insufficient_balance());
        assert_eq!(books.ledger.balance_of(ALICE, Asset::Cash), 100);
    }

    #[test]
    fn test_escrow_draws_from_claim() {
        let mut ledger = InMemoryLedger::new();
        ledger.credit(ALICE, Asset::Cash, 100).unwrap();
        ledger.credit(ALICE, Asset::share(MARKET, Outcome::Yes), 10).unwrap();
        let mut exits = ExitRegistry::new();
        let id = exits.initialize_for_exit(&mut ledger, MARKET, ALICE).unwrap();

        let mut books = Books { ledger: &mut ledger, exits: &mut exits };
        let target = EscrowTarget::new(id);

        assert_eq!(target.share_balance(&books, ALICE, MARKET, Outcome::Yes), 10);
        assert_eq!(
            target.share_balance(&books, ALICE, Address::repeat_byte(0x99), Outcome::Yes),
            0
        );

        target.withdraw(&mut books, ALICE, &debit(40, 4)).unwrap();
        assert_eq!(books.exits.lookup_exit(id).unwrap(), ExitBalances::new(0, 6, 60));

        let err = target.withdraw(&mut books, ALICE, &debit(61, 0)).unwrap_err();
        assert!(err.is_insufficient_escrow());
    }

    #[test]
    fn test_credits_merge_and_apply() {
        let mut ledger = InMemoryLedger::new();
        let legs = PartyLegs {
            cash_out: 0,
            cash_in: 7,
            shares_out: [0, 0],
            shares_in: [3, 0],
        };
        let mut credits = Credits::new();
        credits.add_legs(ALICE, MARKET, &legs).unwrap();
        credits.add(ALICE, Asset::Cash, 5).unwrap();
        assert_eq!(credits.amount(ALICE, Asset::Cash), 12);

        credits.ensure(&ledger).unwrap();
        credits.apply(&mut ledger).unwrap();

        assert_eq!(ledger.balance_of(ALICE, Asset::Cash), 12);
        assert_eq!(ledger.balance_of(ALICE, Asset::share(MARKET, Outcome::No)), 3);
        assert_eq!(ledger.balance_of(ALICE, Asset::share(MARKET, Outcome::Yes)), 0);
    }

    #[test]
    fn test_credits_detect_overflow_before_applying() {
        let mut ledger = InMemoryLedger::new();
        ledger.credit(ALICE, Asset::share(MARKET, Outcome::Yes), u128::MAX).unwrap();

        let mut credits = Credits::new();
        credits.add(MARKET, Asset::Cash, 10).unwrap();
        credits.add(ALICE, Asset::share(MARKET, Outcome::Yes), 1).unwrap();

        let err = credits.ensure(&ledger).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Overflow {
                account: ALICE,
                asset: Asset::share(MARKET, Outcome::Yes),
            }
        );
        assert_eq!(ledger.balance_of(MARKET, Asset::Cash), 0);

        // Merging itself refuses to wrap
        let mut credits = Credits::new();
        credits.add(ALICE, Asset::Cash, u128::MAX).unwrap();
        assert!(credits.add(ALICE, Asset::Cash, 1).is_err());
    }
}
