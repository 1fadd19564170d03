//! Maker signature verification.
//!
//! ## Wire Format
//!
//! ```text
//! v (1) || r (32) || s (32) || scheme (1)   = 66 bytes
//! ```
//!
//! `v` is the recovery id, either raw (0/1) or Ethereum style (27/28).
//!
//! ## Schemes
//!
//! The trailing tag selects the digest the maker actually signed:
//!
//! | Tag  | Scheme    | Digest                                                  |
//! |------|-----------|---------------------------------------------------------|
//! | 0x02 | `Eip712`  | the order hash itself                                   |
//! | 0x03 | `EthSign` | `keccak256("\x19Ethereum Signed Message:\n32" || hash)` |
//!
//! New conventions are added as [`SignatureScheme`] variants; the verifier
//! only decides which variants it accepts.

use alloy_primitives::{eip191_hash_message, Address, Signature, B256, U256};
use serde::Deserialize;
use tracing::trace;

use crate::error::SignatureError;
use crate::types::OrderHash;

/// Encoded signature length
pub const SIGNATURE_LEN: usize = 66;

/// Signing convention carried in the signature's trailing byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureScheme {
    /// Signature over the raw 32-byte order hash
    Eip712,
    /// Signature over the personal-message prefixed hash
    EthSign,
}

impl SignatureScheme {
    pub const ALL: [SignatureScheme; 2] = [SignatureScheme::Eip712, SignatureScheme::EthSign];

    pub fn tag(self) -> u8 {
        match self {
            SignatureScheme::Eip712 => 0x02,
            SignatureScheme::EthSign => 0x03,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x02 => Some(SignatureScheme::Eip712),
            0x03 => Some(SignatureScheme::EthSign),
            _ => None,
        }
    }

    /// Digest the maker's key signed under this scheme
    pub fn digest(self, hash: &OrderHash) -> B256 {
        match self {
            SignatureScheme::Eip712 => *hash,
            SignatureScheme::EthSign => eip191_hash_message(hash.as_slice()),
        }
    }
}

/// Parsed maker signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSignature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
    pub scheme: SignatureScheme,
}

impl OrderSignature {
    pub fn new(v: u8, r: B256, s: B256, scheme: SignatureScheme) -> Self {
        Self { v, r, s, scheme }
    }

    /// Parse the 66-byte wire form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(SignatureError::InvalidLength {
                expected: SIGNATURE_LEN,
                actual: bytes.len(),
            });
        }

        let scheme = SignatureScheme::from_tag(bytes[65])
            .ok_or(SignatureError::UnknownScheme(bytes[65]))?;

        Ok(Self {
            v: bytes[0],
            r: B256::from_slice(&bytes[1..33]),
            s: B256::from_slice(&bytes[33..65]),
            scheme,
        })
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[0] = self.v;
        out[1..33].copy_from_slice(self.r.as_slice());
        out[33..65].copy_from_slice(self.s.as_slice());
        out[65] = self.scheme.tag();
        out
    }

    pub fn from_hex(s: &str) -> Result<Self, SignatureError> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| SignatureError::Hex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// y-parity encoded by `v`
    pub fn y_parity(&self) -> Result<bool, SignatureError> {
        match self.v {
            0 | 27 => Ok(false),
            1 | 28 => Ok(true),
            other => Err(SignatureError::InvalidRecoveryId(other)),
        }
    }

    /// Recover the signing address for `hash`
    pub fn recover(&self, hash: &OrderHash) -> Option<Address> {
        let parity = self.y_parity().ok()?;
        let signature = Signature::new(
            U256::from_be_slice(self.r.as_slice()),
            U256::from_be_slice(self.s.as_slice()),
            parity,
        );
        signature
            .recover_address_from_prehash(&self.scheme.digest(hash))
            .ok()
    }
}

/// Checks that an order hash was signed by a claimed maker.
///
/// Verification is a predicate: malformed bytes, unaccepted schemes,
/// failed recovery and address mismatch all yield `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureVerifier {
    accepted: Vec<SignatureScheme>,
}

impl Default for SignatureVerifier {
    fn default() -> Self {
        Self::new(SignatureScheme::ALL.to_vec())
    }
}

impl SignatureVerifier {
    pub fn new(accepted: Vec<SignatureScheme>) -> Self {
        Self { accepted }
    }

    pub fn accepts(&self, scheme: SignatureScheme) -> bool {
        self.accepted.contains(&scheme)
    }

    /// Verify raw wire bytes
    pub fn verify(&self, hash: &OrderHash, claimed_signer: Address, signature: &[u8]) -> bool {
        match OrderSignature::from_bytes(signature) {
            Ok(parsed) => self.verify_parsed(hash, claimed_signer, &parsed),
            Err(err) => {
                trace!(%err, "unparsable signature");
                false
            }
        }
    }

    pub fn verify_parsed(
        &self,
        hash: &OrderHash,
        claimed_signer: Address,
        signature: &OrderSignature,
    ) -> bool {
        if !self.accepts(signature.scheme) {
            trace!(scheme = ?signature.scheme, "signature scheme not accepted");
            return false;
        }
        match signature.recover(hash) {
            Some(recovered) => recovered == claimed_signer,
            None => false,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_tags() {
        assert_eq!(SignatureScheme::Eip712.tag(), 0x02);
        assert_eq!(SignatureScheme::EthSign.tag(), 0x03);
        assert_eq!(SignatureScheme::from_tag(0x03), Some(SignatureScheme::EthSign));
        assert_eq!(SignatureScheme::from_tag(0x07), None);
    }

    #[test]
    fn test_eth_sign_digest_uses_prefix() {
        let hash = B256::repeat_byte(0x42);
        let mut preimage = b"\x19Ethereum Signed Message:\n32".to_vec();
        preimage.extend_from_slice(hash.as_slice());

        assert_eq!(
            SignatureScheme::EthSign.digest(&hash),
            alloy_primitives::keccak256(preimage)
        );
        assert_eq!(SignatureScheme::Eip712.digest(&hash), hash);
    }

    #[test]
    fn test_wire_roundtrip() {
        let sig = OrderSignature::new(
            28,
            B256::repeat_byte(0x01),
            B256::repeat_byte(0x02),
            SignatureScheme::EthSign,
        );
        let bytes = sig.to_bytes();
        assert_eq!(bytes[0], 28);
        assert_eq!(bytes[65], 0x03);
        assert_eq!(OrderSignature::from_bytes(&bytes).unwrap(), sig);
        assert_eq!(OrderSignature::from_hex(&sig.to_hex()).unwrap(), sig);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            OrderSignature::from_bytes(&[0u8; 65]),
            Err(SignatureError::InvalidLength { expected: 66, actual: 65 })
        );

        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[65] = 0x09;
        assert_eq!(OrderSignature::from_bytes(&bytes), Err(SignatureError::UnknownScheme(0x09)));
    }

    #[test]
    fn test_recovery_id_range() {
        let mut sig = OrderSignature::new(27, B256::ZERO, B256::ZERO, SignatureScheme::EthSign);
        assert_eq!(sig.y_parity(), Ok(false));
        sig.v = 1;
        assert_eq!(sig.y_parity(), Ok(true));
        sig.v = 29;
        assert_eq!(sig.y_parity(), Err(SignatureError::InvalidRecoveryId(29)));
    }

    #[test]
    fn test_garbage_never_verifies() {
        let verifier = SignatureVerifier::default();
        let hash = B256::repeat_byte(0x42);
        let signer = Address::repeat_byte(0x22);

        assert!(!verifier.verify(&hash, signer, &[]));
        assert!(!verifier.verify(&hash, signer, &[0u8; SIGNATURE_LEN]));

        // r = s = 0 cannot be recovered
        let zero = OrderSignature::new(27, B256::ZERO, B256::ZERO, SignatureScheme::EthSign);
        assert!(!verifier.verify(&hash, signer, &zero.to_bytes()));
    }
}
