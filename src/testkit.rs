//! Deterministic makers and signed orders for tests and benchmarks.
//!
//! Enabled with the `testkit` feature.

use alloy_primitives::{Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;

use crate::codec::OrderCodec;
use crate::engine::TradeRequest;
use crate::error::CodecError;
use crate::signature::{OrderSignature, SignatureScheme};
use crate::types::{Order, OrderHash, Outcome, Side};

pub use crate::engine::ManualClock;

#[derive(Error, Debug)]
pub enum TestkitError {
    #[error("signer error: {0}")]
    Signer(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// A maker whose key is derived from a one-byte seed.
#[derive(Debug, Clone)]
pub struct TestMaker {
    signer: PrivateKeySigner,
}

impl TestMaker {
    /// Key `[seed; 32]`; seed 0 is not a valid key
    pub fn new(seed: u8) -> Result<Self, TestkitError> {
        let signer = PrivateKeySigner::from_bytes(&B256::repeat_byte(seed))
            .map_err(|e| TestkitError::Signer(e.to_string()))?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Unsigned order with this maker filled in
    pub fn order(
        &self,
        market: Address,
        side: Side,
        outcome: Outcome,
        price: u64,
        amount: u128,
    ) -> Order {
        Order::new(market, side, outcome, price, amount, self.address())
    }

    pub fn sign(
        &self,
        hash: &OrderHash,
        scheme: SignatureScheme,
    ) -> Result<OrderSignature, TestkitError> {
        let signature = match scheme {
            SignatureScheme::Eip712 => self.signer.sign_hash_sync(hash),
            SignatureScheme::EthSign => self.signer.sign_message_sync(hash.as_slice()),
        }
        .map_err(|e| TestkitError::Signer(e.to_string()))?;

        Ok(OrderSignature::new(
            27 + u8::from(signature.v()),
            B256::from(signature.r().to_be_bytes::<32>()),
            B256::from(signature.s().to_be_bytes::<32>()),
            scheme,
        ))
    }

    /// Encode, hash and sign an order
    pub fn sign_order(
        &self,
        codec: &OrderCodec,
        order: Order,
        scheme: SignatureScheme,
    ) -> Result<SignedOrder, TestkitError> {
        let bytes = codec.encode(&order)?;
        let hash = codec.hash_for_exchange(&order)?;
        let signature = self.sign(&hash, scheme)?.to_bytes().to_vec();
        Ok(SignedOrder {
            order,
            hash,
            bytes,
            signature,
        })
    }
}

/// An order with its wire encoding and wire signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrder {
    pub order: Order,
    pub hash: OrderHash,
    pub bytes: Vec<u8>,
    pub signature: Vec<u8>,
}

impl SignedOrder {
    /// Append to a request
    pub fn attach(&self, request: TradeRequest) -> TradeRequest {
        request.with_order(self.bytes.clone(), self.signature.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::SignatureVerifier;

    #[test]
    fn test_signatures_verify_under_both_schemes() {
        let maker = TestMaker::new(7).unwrap();
        let codec = OrderCodec::default();
        let verifier = SignatureVerifier::default();
        let order = maker.order(Address::repeat_byte(0x11), Side::Bid, Outcome::Yes, 60, 10);

        for scheme in SignatureScheme::ALL {
            let signed = maker.sign_order(&codec, order.clone(), scheme).unwrap();
            assert!(verifier.verify(&signed.hash, maker.address(), &signed.signature));
            assert!(!verifier.verify(&signed.hash, Address::repeat_byte(0x22), &signed.signature));
        }
    }

    #[test]
    fn test_zero_seed_is_rejected() {
        assert!(TestMaker::new(0).is_err());
    }

    #[test]
    fn test_makers_are_deterministic() {
        assert_eq!(TestMaker::new(3).unwrap().address(), TestMaker::new(3).unwrap().address());
        assert_ne!(TestMaker::new(3).unwrap().address(), TestMaker::new(4).unwrap().address());
    }
}
