//! Fixed-point amount utilities.
//!
//! ## Overview
//!
//! Share and cash quantities are stored as `u128` scaled by 10^18, the same
//! "attoshare" convention the settlement contracts use. One complete set of
//! `a` shares (one YES plus one NO share per unit) is backed by exactly `a`
//! units of cash.
//!
//! Prices are plain integers counted in ticks: a price of 60 on a market
//! with 100 ticks means 0.60 cash per share.
//!
//! ## Examples
//!
//! ```
//! use exit_settlement::types::amount::{fix, to_fixed, from_fixed, SCALE};
//!
//! assert_eq!(fix(2), 2 * SCALE);
//! assert_eq!(to_fixed("1.5"), Some(1_500_000_000_000_000_000));
//! assert_eq!(from_fixed(fix(3)).as_deref(), Some("3"));
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor for fixed-point amounts: 10^18
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Decimal places carried by [`SCALE`]
pub const SCALE_DECIMALS: u32 = 18;

/// Default number of ticks on a binary market (prices 1..=99)
pub const DEFAULT_NUM_TICKS: u64 = 100;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Whole units to fixed-point: `fix(2) == 2 * 10^18`
#[inline]
pub const fn fix(units: u64) -> u128 {
    units as u128 * SCALE
}

/// Convert a decimal string to a fixed-point amount
///
/// Returns `None` for negative values, unparsable input or overflow.
///
/// ```
/// use exit_settlement::types::amount::to_fixed;
///
/// assert_eq!(to_fixed("0.6"), Some(600_000_000_000_000_000));
/// assert_eq!(to_fixed("-1"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u128> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to a fixed-point amount
pub fn decimal_to_fixed(d: Decimal) -> Option<u128> {
    if d.is_sign_negative() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(SCALE as u64))?;
    scaled.round_dp(0).to_u128()
}

/// Convert a fixed-point amount to a Decimal
///
/// Returns `None` when the amount exceeds Decimal's 96-bit mantissa.
pub fn fixed_to_decimal(value: u128) -> Option<Decimal> {
    let raw = i128::try_from(value).ok()?;
    Decimal::try_from_i128_with_scale(raw, SCALE_DECIMALS).ok()
}

/// Render a fixed-point amount with trailing zeros trimmed
pub fn from_fixed(value: u128) -> Option<String> {
    fixed_to_decimal(value).map(|d| d.normalize().to_string())
}

// ============================================================================
// Arithmetic
// ============================================================================

/// `floor(a * b / d)` with overflow and zero-divisor checks
pub fn mul_div_down(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    a.checked_mul(b).map(|product| product / d)
}

/// `ceil(a * b / d)` with overflow and zero-divisor checks
pub fn mul_div_up(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let product = a.checked_mul(b)?;
    let quotient = product / d;
    if product % d == 0 {
        Some(quotient)
    } else {
        quotient.checked_add(1)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
