//! Signed order record for binary outcome markets.
//!
//! ## SSZ Serialization
//!
//! [`Order`] derives `SimpleSerialize` from ssz_rs. Every field is fixed
//! size, so the canonical encoding is the plain concatenation of the fields
//! (integers little-endian) and is exactly [`ORDER_ENCODED_LEN`] bytes.
//! The order hash is computed over this encoding, so the field order below
//! must never change for a deployment.
//!
//! ## Enumerations
//!
//! Side and outcome are stored as raw `u8` values for SSZ compatibility and
//! exposed through typed accessors.

use alloy_primitives::Address;
use ssz_rs::prelude::*;

/// Byte length of an encoded order: 20+8+1+1+20+16+8+8+20+20
pub const ORDER_ENCODED_LEN: usize = 122;

// ============================================================================
// Side enum
// ============================================================================

/// Order side from the maker's point of view
///
/// - Bid = 0: maker buys the outcome
/// - Ask = 1: maker sells the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Bid,
    Ask,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Bid => 0,
            Side::Ask => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Bid),
            1 => Some(Side::Ask),
            _ => None,
        }
    }

    /// The side a taker plays against this order
    pub fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

// ============================================================================
// Outcome enum
// ============================================================================

/// Share class of a binary market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Outcome {
    #[default]
    No,
    Yes,
}

impl Outcome {
    /// Both outcomes, indexed by [`Outcome::index`]
    pub const ALL: [Outcome; 2] = [Outcome::No, Outcome::Yes];

    pub fn to_u8(self) -> u8 {
        match self {
            Outcome::No => 0,
            Outcome::Yes => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Outcome::No),
            1 => Some(Outcome::Yes),
            _ => None,
        }
    }

    /// The other half of a complete set
    pub fn complement(self) -> Self {
        match self {
            Outcome::No => Outcome::Yes,
            Outcome::Yes => Outcome::No,
        }
    }

    /// Position in per-outcome balance arrays
    #[inline]
    pub fn index(self) -> usize {
        self.to_u8() as usize
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// An off-chain signed limit order for one outcome of a binary market.
///
/// The maker signs the order hash; the order itself never moves funds until
/// a taker settles against it. Orders are immutable once hashed: any change,
/// including the salt, yields a different hash and therefore a different
/// fill counter.
///
/// ## Example
///
/// ```
/// use alloy_primitives::Address;
/// use exit_settlement::types::{Order, Outcome, Side};
/// use exit_settlement::types::amount::fix;
///
/// let market = Address::repeat_byte(0x11);
/// let maker = Address::repeat_byte(0x22);
///
/// let order = Order::new(market, Side::Bid, Outcome::Yes, 60, fix(2), maker)
///     .with_expiration(1_900_000_000)
///     .with_salt(5);
///
/// assert_eq!(order.side(), Some(Side::Bid));
/// assert_eq!(order.kyc_restriction(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Market the outcome shares belong to
    pub market: [u8; 20],

    /// Limit price in ticks, 1..=num_ticks-1
    pub price: u64,

    /// Outcome as u8 (0=No, 1=Yes)
    pub outcome_raw: u8,

    /// Side as u8 (0=Bid, 1=Ask)
    pub side_raw: u8,

    /// Token the taker must hold; all zero means no restriction
    pub kyc_token: [u8; 20],

    /// Order size in fixed-point shares (10^18 scale)
    pub amount: u128,

    /// Unix timestamp (seconds) after which the order is dead
    pub expiration: u64,

    /// Nonce that keeps otherwise identical orders distinct
    pub salt: u64,

    /// Signer of the order
    pub maker: [u8; 20],

    /// Exchange the order is bound to (hash domain)
    pub exchange: [u8; 20],
}

impl Order {
    /// Create an order with no KYC restriction, no expiration and salt 0
    pub fn new(
        market: Address,
        side: Side,
        outcome: Outcome,
        price: u64,
        amount: u128,
        maker: Address,
    ) -> Self {
        Self {
            market: market.0 .0,
            price,
            outcome_raw: outcome.to_u8(),
            side_raw: side.to_u8(),
            kyc_token: [0u8; 20],
            amount,
            expiration: u64::MAX,
            salt: 0,
            maker: maker.0 .0,
            exchange: [0u8; 20],
        }
    }

    pub fn with_expiration(mut self, expiration: u64) -> Self {
        self.expiration = expiration;
        self
    }

    pub fn with_salt(mut self, salt: u64) -> Self {
        self.salt = salt;
        self
    }

    pub fn with_kyc_token(mut self, token: Address) -> Self {
        self.kyc_token = token.0 .0;
        self
    }

    pub fn with_exchange(mut self, exchange: Address) -> Self {
        self.exchange = exchange.0 .0;
        self
    }

    /// Typed side; `None` only for records that bypassed the codec
    pub fn side(&self) -> Option<Side> {
        Side::from_u8(self.side_raw)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        Outcome::from_u8(self.outcome_raw)
    }

    pub fn market(&self) -> Address {
        Address::from(self.market)
    }

    pub fn maker(&self) -> Address {
        Address::from(self.maker)
    }

    pub fn exchange(&self) -> Address {
        Address::from(self.exchange)
    }

    /// KYC token the taker must hold, if any
    pub fn kyc_restriction(&self) -> Option<Address> {
        let token = Address::from(self.kyc_token);
        (token != Address::ZERO).then_some(token)
    }

    /// An order is live strictly before its expiration
    #[inline]
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiration
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::amount::fix;

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
    }

    #[test]
    fn test_side_conversion() {
        assert_eq!(Side::Bid.to_u8(), 0);
        assert_eq!(Side::Ask.to_u8(), 1);
        assert_eq!(Side::from_u8(0), Some(Side::Bid));
        assert_eq!(Side::from_u8(1), Some(Side::Ask));
        assert_eq!(Side::from_u8(2), None);
        assert_eq!(Side::Bid.opposite(), Side::Ask);
    }

    #[test]
    fn test_outcome_conversion() {
        assert_eq!(Outcome::from_u8(0), Some(Outcome::No));
        assert_eq!(Outcome::from_u8(1), Some(Outcome::Yes));
        assert_eq!(Outcome::from_u8(7), None);
        assert_eq!(Outcome::Yes.complement(), Outcome::No);
        assert_eq!(Outcome::No.index(), 0);
        assert_eq!(Outcome::Yes.index(), 1);
    }

    #[test]
    fn test_order_accessors() {
        let order = sample();
        assert_eq!(order.side(), Some(Side::Bid));
        assert_eq!(order.outcome(), Some(Outcome::Yes));
        assert_eq!(order.market(), Address::repeat_byte(0x11));
        assert_eq!(order.maker(), Address::repeat_byte(0x22));
        assert_eq!(order.kyc_restriction(), None);

        let restricted = sample().with_kyc_token(Address::repeat_byte(0x33));
        assert_eq!(restricted.kyc_restriction(), Some(Address::repeat_byte(0x33)));
    }

    #[test]
    fn test_order_expiration_boundary() {
        let order = sample();
        assert!(!order.is_expired(1_899_999_999));
        assert!(order.is_expired(1_900_000_000));
    }

    #[test]
    fn test_order_ssz_size() {
        let bytes = ssz_rs::serialize(&sample()).expect("Failed to serialize");
        assert_eq!(bytes.len(), ORDER_ENCODED_LEN);
    }
}
