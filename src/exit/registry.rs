//! Exit claim registry.
//!
//! ## Memory Model
//!
//! Claims live in a [`Slab`] arena; a `HashMap` maps each [`ExitId`] to its
//! slab key, the same split the order book uses for orders and their ids.
//! Claims are never removed, so an id, once issued, keeps resolving.

use std::collections::HashMap;

use alloy_primitives::Address;
use slab::Slab;
use tracing::{info, warn};

use crate::error::ExitError;
use crate::exit::{ExitBalances, ExitClaim, ExitId};
use crate::ledger::{Asset, AssetLedger};
use crate::types::Outcome;

/// Arena of exit claims.
#[derive(Debug, Default)]
pub struct ExitRegistry {
    claims: Slab<ExitClaim>,
    index: HashMap<ExitId, usize>,
}

impl ExitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            claims: Slab::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Open an exit for `participant` on `market`.
    ///
    /// Snapshots the participant's cash, YES and NO balances from `ledger`
    /// and moves them into the claim, so later ledger activity cannot
    /// change the escrow and the escrowed funds cannot be spent twice.
    ///
    /// # Errors
    ///
    /// `ExitAlreadyExists` if the pair already has a claim.
    pub fn initialize_for_exit(
        &mut self,
        ledger: &mut dyn AssetLedger,
        market: Address,
        participant: Address,
    ) -> Result<ExitId, ExitError> {
        let id = ExitId::derive(market, participant);
        if self.index.contains_key(&id) {
            return Err(ExitError::ExitAlreadyExists { market, participant });
        }

        let no = Asset::share(market, Outcome::No);
        let yes = Asset::share(market, Outcome::Yes);
        let balances = ExitBalances::new(
            ledger.balance_of(participant, no),
            ledger.balance_of(participant, yes),
            ledger.balance_of(participant, Asset::Cash),
        );

        let legs = [
            (no, balances.shares[0]),
            (yes, balances.shares[1]),
            (Asset::Cash, balances.cash),
        ];
        for (asset, amount) in legs {
            ledger.ensure_available(participant, asset, amount)?;
        }
        for (taken, (asset, amount)) in legs.iter().enumerate() {
            if let Err(err) = ledger.debit(participant, *asset, *amount) {
                // Hand back what already moved so the position stays whole
                for (asset, amount) in &legs[..taken] {
                    if let Err(refund) = ledger.credit(participant, *asset, *amount) {
                        warn!(%participant, %asset, amount, %refund, "exit rollback failed");
                    }
                }
                return Err(err.into());
            }
        }

        let key = self.claims.insert(ExitClaim {
            id,
            market,
            participant,
            balances,
        });
        self.index.insert(id, key);

        info!(
            exit_id = %id,
            %market,
            %participant,
            cash = balances.cash,
            yes = balances.shares[1],
            no = balances.shares[0],
            "exit initialized"
        );
        Ok(id)
    }

    /// Current escrowed balances
    pub fn lookup_exit(&self, id: ExitId) -> Result<ExitBalances, ExitError> {
        self.claim(id)
            .map(|claim| claim.balances)
            .ok_or(ExitError::UnknownExit(id))
    }

    pub fn claim(&self, id: ExitId) -> Option<&ExitClaim> {
        let key = *self.index.get(&id)?;
        self.claims.get(key)
    }

    /// Fail with `InsufficientEscrow` unless `delta` could be debited
    pub fn ensure_debit(&self, id: ExitId, delta: &ExitBalances) -> Result<(), ExitError> {
        let balances = self.lookup_exit(id)?;
        Self::apply_delta(id, &balances, delta).map(|_| ())
    }

    /// Debit `delta` from the claim, all components or none.
    pub(crate) fn debit(&mut self, id: ExitId, delta: &ExitBalances) -> Result<(), ExitError> {
        let key = *self.index.get(&id).ok_or(ExitError::UnknownExit(id))?;
        let claim = self.claims.get_mut(key).ok_or(ExitError::UnknownExit(id))?;
        claim.balances = Self::apply_delta(id, &claim.balances, delta)?;
        Ok(())
    }

    fn apply_delta(
        id: ExitId,
        balances: &ExitBalances,
        delta: &ExitBalances,
    ) -> Result<ExitBalances, ExitError> {
        balances
            .checked_sub(delta)
            .ok_or_else(|| ExitError::InsufficientEscrow {
                exit_id: id,
                detail: format!(
                    "have cash={} no={} yes={}, need cash={} no={} yes={}",
                    balances.cash,
                    balances.shares[0],
                    balances.shares[1],
                    delta.cash,
                    delta.shares[0],
                    delta.shares[1],
                ),
            })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
