//! Canonical order encoding and hashing.
//!
//! ## Wire Layout
//!
//! Orders travel as the SSZ encoding of [`Order`]: a fixed
//! [`ORDER_ENCODED_LEN`]-byte record. Decoding checks the length first,
//! then the domain of every enumerated or bounded field, so a record that
//! decodes is always settleable.
//!
//! ## Hashing
//!
//! ```text
//! domain = keccak256("ExitSettlement.Exchange" || exchange)
//! hash   = keccak256(domain || ssz(order))
//! ```
//!
//! The hash is the key for cumulative-fill tracking and the message the
//! maker signs.

use alloy_primitives::{keccak256, Address, Keccak256, B256};
use tracing::trace;

use crate::error::CodecError;
use crate::types::amount::DEFAULT_NUM_TICKS;
use crate::types::{Order, OrderHash, Outcome, Side, ORDER_ENCODED_LEN};

/// Tag mixed into every domain separator
pub const DOMAIN_TAG: &[u8] = b"ExitSettlement.Exchange";

/// Domain separator for orders bound to `exchange`
pub fn domain_separator(exchange: Address) -> B256 {
    let mut preimage = Vec::with_capacity(DOMAIN_TAG.len() + 20);
    preimage.extend_from_slice(DOMAIN_TAG);
    preimage.extend_from_slice(exchange.as_slice());
    keccak256(preimage)
}

/// Encoder/decoder for a market family sharing one tick size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCodec {
    num_ticks: u64,
}

impl Default for OrderCodec {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_TICKS)
    }
}

impl OrderCodec {
    pub fn new(num_ticks: u64) -> Self {
        Self { num_ticks }
    }

    #[inline]
    pub fn num_ticks(&self) -> u64 {
        self.num_ticks
    }

    /// Canonical bytes of an order
    pub fn encode(&self, order: &Order) -> Result<Vec<u8>, CodecError> {
        ssz_rs::serialize(order).map_err(|e| CodecError::Serialize(format!("{e:?}")))
    }

    /// Parse and validate canonical bytes
    ///
    /// # Errors
    ///
    /// - `InvalidLength` unless `bytes.len() == ORDER_ENCODED_LEN`
    /// - `InvalidSide` / `InvalidOutcome` for unknown enum bytes
    /// - `PriceOutOfRange` unless `1 <= price < num_ticks`
    /// - `ZeroAmount` for an empty order
    pub fn decode(&self, bytes: &[u8]) -> Result<Order, CodecError> {
        if bytes.len() != ORDER_ENCODED_LEN {
            return Err(CodecError::InvalidLength {
                expected: ORDER_ENCODED_LEN,
                actual: bytes.len(),
            });
        }

        let order: Order =
            ssz_rs::deserialize(bytes).map_err(|e| CodecError::Deserialize(format!("{e:?}")))?;
        self.validate(&order)?;

        trace!(maker = %order.maker(), salt = order.salt, "decoded order");
        Ok(order)
    }

    /// Check every field against its domain
    pub fn validate(&self, order: &Order) -> Result<(), CodecError> {
        if Side::from_u8(order.side_raw).is_none() {
            return Err(CodecError::InvalidSide(order.side_raw));
        }
        if Outcome::from_u8(order.outcome_raw).is_none() {
            return Err(CodecError::InvalidOutcome(order.outcome_raw));
        }
        if order.price == 0 || order.price >= self.num_ticks {
            return Err(CodecError::PriceOutOfRange {
                price: order.price,
                num_ticks: self.num_ticks,
            });
        }
        if order.amount == 0 {
            return Err(CodecError::ZeroAmount);
        }
        Ok(())
    }

    /// Deterministic order hash under `domain`
    pub fn hash(&self, order: &Order, domain: B256) -> Result<OrderHash, CodecError> {
        let encoded = self.encode(order)?;

        let mut hasher = Keccak256::new();
        hasher.update(domain);
        hasher.update(&encoded);
        Ok(hasher.finalize())
    }

    /// Hash under the order's own exchange domain
    pub fn hash_for_exchange(&self, order: &Order) -> Result<OrderHash, CodecError> {
        self.hash(order, domain_separator(order.exchange()))
    }

    /// Hex helpers for transport boundaries ("0x" prefix optional on input)
    pub fn encode_hex(&self, order: &Order) -> Result<String, CodecError> {
        self.encode(order).map(|bytes| format!("0x{}", hex::encode(bytes)))
    }

    pub fn decode_hex(&self, s: &str) -> Result<Order, CodecError> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| CodecError::Hex(e.to_string()))?;
        self.decode(&bytes)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::amount::fix;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn sample() -> Order {
        Order::new(
            Address::repeat_byte(0x11),
            Side::Bid,
            Outcome::Yes,
            60,
            fix(2),
            Address::repeat_byte(0x22),
        )
        .with_expiration(1_900_000_000)
        .with_salt(5)
        .with_exchange(Address::repeat_byte(0xEE))
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let codec = OrderCodec::default();
        let order = sample().with_kyc_token(Address::repeat_byte(0x44));

        let bytes = codec.encode(&order).unwrap();
        assert_eq!(bytes.len(), ORDER_ENCODED_LEN);
        assert_eq!(codec.decode(&bytes).unwrap(), order);
    }

    #[test]
    fn test_roundtrip_seeded_orders() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..500 {
            let num_ticks = rng.gen_range(2..=10_000u64);
            let codec = OrderCodec::new(num_ticks);
            let side = if rng.gen_bool(0.5) { Side::Bid } else { Side::Ask };
            let outcome = if rng.gen_bool(0.5) { Outcome::Yes } else { Outcome::No };
            let mut order = Order::new(
                Address::from(rng.gen::<[u8; 20]>()),
                side,
                outcome,
                rng.gen_range(1..num_ticks),
                rng.gen_range(1..=u128::MAX),
                Address::from(rng.gen::<[u8; 20]>()),
            )
            .with_expiration(rng.gen())
            .with_salt(rng.gen())
            .with_exchange(Address::from(rng.gen::<[u8; 20]>()));
            if rng.gen_bool(0.5) {
                order = order.with_kyc_token(Address::from(rng.gen::<[u8; 20]>()));
            }

            let bytes = codec.encode(&order).unwrap();
            assert_eq!(bytes.len(), ORDER_ENCODED_LEN);
            assert_eq!(codec.decode(&bytes).unwrap(), order);
        }
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let codec = OrderCodec::default();
        let mut bytes = codec.encode(&sample()).unwrap();
        bytes.push(0);

        assert_eq!(
            codec.decode(&bytes),
            Err(CodecError::InvalidLength { expected: ORDER_ENCODED_LEN, actual: ORDER_ENCODED_LEN + 1 })
        );
        assert!(matches!(codec.decode(&[]), Err(CodecError::InvalidLength { .. })));
    }

    #[test]
    fn test_decode_rejects_bad_side_and_outcome() {
        let codec = OrderCodec::default();

        let mut order = sample();
        order.side_raw = 2;
        let bytes = codec.encode(&order).unwrap();
        assert_eq!(codec.decode(&bytes), Err(CodecError::InvalidSide(2)));

        let mut order = sample();
        order.outcome_raw = 9;
        let bytes = codec.encode(&order).unwrap();
        assert_eq!(codec.decode(&bytes), Err(CodecError::InvalidOutcome(9)));
    }

    #[test]
    fn test_decode_rejects_price_outside_ticks() {
        let codec = OrderCodec::new(100);
        for price in [0u64, 100, 250] {
            let mut order = sample();
            order.price = price;
            let bytes = codec.encode(&order).unwrap();
            assert_eq!(
                codec.decode(&bytes),
                Err(CodecError::PriceOutOfRange { price, num_ticks: 100 })
            );
        }

        // Bounds are inclusive of 1 and num_ticks - 1
        for price in [1u64, 99] {
            let mut order = sample();
            order.price = price;
            let bytes = codec.encode(&order).unwrap();
            assert!(codec.decode(&bytes).is_ok());
        }
    }

    #[test]
    fn test_decode_rejects_zero_amount() {
        let codec = OrderCodec::default();
        let mut order = sample();
        order.amount = 0;
        let bytes = codec.encode(&order).unwrap();
        assert_eq!(codec.decode(&bytes), Err(CodecError::ZeroAmount));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let codec = OrderCodec::default();
        let domain = domain_separator(Address::repeat_byte(0xEE));
        assert_eq!(
            codec.hash(&sample(), domain).unwrap(),
            codec.hash(&sample(), domain).unwrap()
        );
    }

    #[test]
    fn test_hash_changes_with_every_field() {
        let codec = OrderCodec::default();
        let domain = domain_separator(Address::repeat_byte(0xEE));
        let base = codec.hash(&sample(), domain).unwrap();

        let variants = vec![
            sample().with_salt(6),
            sample().with_expiration(1_900_000_001),
            sample().with_kyc_token(Address::repeat_byte(0x01)),
            sample().with_exchange(Address::repeat_byte(0xEF)),
            Order { price: 61, ..sample() },
            Order { amount: fix(3), ..sample() },
            Order { side_raw: Side::Ask.to_u8(), ..sample() },
            Order { outcome_raw: Outcome::No.to_u8(), ..sample() },
            Order { market: [0x12; 20], ..sample() },
            Order { maker: [0x23; 20], ..sample() },
        ];
        for variant in variants {
            assert_ne!(codec.hash(&variant, domain).unwrap(), base, "{:?}", variant);
        }

        // Same order, different domain
        let other = domain_separator(Address::repeat_byte(0xEF));
        assert_ne!(codec.hash(&sample(), other).unwrap(), base);
    }

    #[test]
    fn test_hex_roundtrip() {
        let codec = OrderCodec::default();
        let hex = codec.encode_hex(&sample()).unwrap();
        assert!(hex.starts_with("0x"));
        assert_eq!(codec.decode_hex(&hex).unwrap(), sample());
        assert!(matches!(codec.decode_hex("0xzz"), Err(CodecError::Hex(_))));
    }
}
