//! Error taxonomy for the settlement engine.
//!
//! Per-order problems (bad signature, expired order, KYC) are not errors:
//! the engine skips the order and records a [`SkipReason`]. Everything in
//! [`SettlementError`] aborts the whole `trade` call.

use alloy_primitives::Address;
use thiserror::Error;

use crate::exit::ExitId;
use crate::ledger::Asset;

/// Order decoding and validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("order must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("ssz decoding failed: {0}")]
    Deserialize(String),

    #[error("ssz encoding failed: {0}")]
    Serialize(String),

    #[error("invalid hex: {0}")]
    Hex(String),

    #[error("unknown side byte {0}")]
    InvalidSide(u8),

    #[error("unknown outcome byte {0}")]
    InvalidOutcome(u8),

    #[error("price {price} outside 1..{num_ticks}")]
    PriceOutOfRange { price: u64, num_ticks: u64 },

    #[error("order amount is zero")]
    ZeroAmount,
}

/// Signature wire-format failures.
///
/// Only produced by the parsing helpers; [`crate::signature::SignatureVerifier::verify`]
/// folds these into `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown signature scheme tag 0x{0:02x}")]
    UnknownScheme(u8),

    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),

    #[error("invalid hex: {0}")]
    Hex(String),
}

/// External asset ledger failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient {asset} balance for {account}: have {available}, need {required}")]
    InsufficientBalance {
        account: Address,
        asset: Asset,
        available: u128,
        required: u128,
    },

    #[error("balance overflow crediting {asset} to {account}")]
    Overflow { account: Address, asset: Asset },
}

/// Exit registry failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExitError {
    #[error("exit already exists for participant {participant} on market {market}")]
    ExitAlreadyExists { market: Address, participant: Address },

    #[error("unknown exit {0}")]
    UnknownExit(ExitId),

    #[error("insufficient escrow in exit {exit_id}: {detail}")]
    InsufficientEscrow { exit_id: ExitId, detail: String },

    #[error("{caller} may not settle through exit {exit_id}")]
    Unauthorized { exit_id: ExitId, caller: Address },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Batch-fatal settlement failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("malformed order at index {index}: {source}")]
    MalformedOrder {
        index: usize,
        #[source]
        source: CodecError,
    },

    #[error("{orders} orders but {signatures} signatures")]
    SignatureCountMismatch { orders: usize, signatures: usize },

    #[error(transparent)]
    Exit(#[from] ExitError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("arithmetic overflow computing fill for order {index}")]
    Overflow { index: usize },
}

impl SettlementError {
    /// True for escrow exhaustion, whichever layer reported it
    pub fn is_insufficient_escrow(&self) -> bool {
        matches!(self, SettlementError::Exit(ExitError::InsufficientEscrow { .. }))
    }

    /// True for a free-balance shortfall on the external ledger
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(
            self,
            SettlementError::Ledger(LedgerError::InsufficientBalance { .. })
                | SettlementError::Exit(ExitError::Ledger(LedgerError::InsufficientBalance { .. }))
        )
    }
}

/// Why an order was passed over without failing the batch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    #[error("signature does not recover to the maker")]
    InvalidSignature,

    #[error("order expired")]
    ExpiredOrder,

    #[error("taker does not hold the required KYC token")]
    KycRestricted,

    #[error("order is bound to a different exchange")]
    ForeignExchange,

    #[error("order market differs from the exit claim's market")]
    MarketMismatch,

    #[error("maker and taker are the same account")]
    SelfTrade,

    #[error("order already fully filled")]
    FullyFilled,
}

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

pub type Result<T, E = SettlementError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escrow_classification() {
        let err = SettlementError::Exit(ExitError::InsufficientEscrow {
            exit_id: ExitId::ZERO,
            detail: "cash".into(),
        });
        assert!(err.is_insufficient_escrow());
        assert!(!err.is_insufficient_balance());
    }

    #[test]
    fn test_balance_classification() {
        let err = SettlementError::Ledger(LedgerError::InsufficientBalance {
            account: Address::ZERO,
            asset: Asset::Cash,
            available: 1,
            required: 2,
        });
        assert!(err.is_insufficient_balance());
        assert!(!err.is_insufficient_escrow());
    }

    #[test]
    fn test_malformed_order_display() {
        let err = SettlementError::MalformedOrder {
            index: 2,
            source: CodecError::InvalidSide(9),
        };
        assert_eq!(err.to_string(), "malformed order at index 2: unknown side byte 9");
    }
}
