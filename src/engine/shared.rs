//! Thread-safe handle around a [`SettlementEngine`].

use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::Mutex;

use crate::engine::request::{TradeOutcome, TradeRequest};
use crate::engine::settlement::{BatchPreparer, SettlementEngine};
use crate::error::{ExitError, Result};
use crate::exit::{ExitBalances, ExitId};
use crate::ledger::AssetLedger;

/// Cloneable handle that serialises settlement across threads.
///
/// Decoding and signature recovery run on the caller's thread; only the
/// mutation phase takes the lock, so concurrent trades against the same
/// order can never fill past its size.
#[derive(Debug)]
pub struct SharedSettlement<L: AssetLedger> {
    preparer: BatchPreparer,
    engine: Arc<Mutex<SettlementEngine<L>>>,
}

impl<L: AssetLedger> Clone for SharedSettlement<L> {
    fn clone(&self) -> Self {
        Self {
            preparer: self.preparer.clone(),
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<L: AssetLedger> SharedSettlement<L> {
    pub fn new(engine: SettlementEngine<L>) -> Self {
        Self {
            preparer: engine.preparer().clone(),
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn settle(&self, request: TradeRequest) -> Result<TradeOutcome> {
        let batch = self.preparer.prepare(request)?;
        self.engine.lock().apply(batch)
    }

    pub fn trade(&self, request: TradeRequest) -> Result<u128> {
        self.settle(request).map(|outcome| outcome.remaining)
    }

    pub fn initialize_for_exit(
        &self,
        market: Address,
        participant: Address,
    ) -> Result<ExitId, ExitError> {
        self.engine.lock().initialize_for_exit(market, participant)
    }

    pub fn lookup_exit(&self, exit_id: ExitId) -> Result<ExitBalances, ExitError> {
        self.engine.lock().lookup_exit(exit_id)
    }

    /// Run `f` with exclusive access to the engine
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut SettlementEngine<L>) -> R) -> R {
        f(&mut self.engine.lock())
    }
}
