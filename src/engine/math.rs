//! Fill arithmetic.
//!
//! ## Legs
//!
//! For a fill of `amount` shares of outcome `O` at price `p` on a market
//! with `T` ticks, the seller first delivers up to `amount` shares of `O`
//! it already holds (`transferred`), paid for by the buyer at `p / T` per
//! share. The rest (`minted`) is created as complete sets: the buyer pays
//! `p / T`, the seller pays `(T - p) / T`, the buyer receives `O`, the
//! seller receives the complement, and the market collateral account
//! receives exactly `minted` cash.
//!
//! ## Rounding
//!
//! Every division rounds in the maker's favour:
//!
//! - cash the maker pays is rounded down
//! - cash the maker receives is rounded up
//! - the taker's complete-set share is `minted - maker_share`, so the
//!   taker absorbs the remainder and total cash is conserved exactly
//!
//! ```
//! use exit_settlement::engine::math::plan_fill;
//! use exit_settlement::types::{Outcome, Side};
//!
//! // 7 units at 60/100, nothing to transfer: maker pays floor(4.2) = 4
//! let plan = plan_fill(Side::Bid, Outcome::Yes, 60, 100, 7, 0).unwrap();
//! assert_eq!(plan.maker.cash_out, 4);
//! assert_eq!(plan.taker.cash_out, 3);
//! assert_eq!(plan.collateral, 7);
//! ```

use crate::types::amount::{mul_div_down, mul_div_up};
use crate::types::{Outcome, Side};

/// Movements for one party in one fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartyLegs {
    pub cash_out: u128,
    pub cash_in: u128,
    /// Shares given up, indexed by [`Outcome::index`]
    pub shares_out: [u128; 2],
    /// Shares received, indexed by [`Outcome::index`]
    pub shares_in: [u128; 2],
}

/// Complete arithmetic of one fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPlan {
    pub amount: u128,
    pub transferred: u128,
    pub minted: u128,
    pub maker: PartyLegs,
    pub taker: PartyLegs,
    /// Cash locked in the market to back the minted sets
    pub collateral: u128,
}

/// Compute the legs of a fill.
///
/// # Arguments
///
/// * `maker_side` - Side of the maker order (Bid: maker buys `outcome`)
/// * `outcome` - Outcome the order trades
/// * `price` - Order price in ticks, `0 < price < num_ticks`
/// * `num_ticks` - Tick count of the market
/// * `amount` - Shares to fill
/// * `seller_shares` - Shares of `outcome` the selling party can deliver
///
/// # Returns
///
/// `None` on arithmetic overflow or a price outside the tick range.
pub fn plan_fill(
    maker_side: Side,
    outcome: Outcome,
    price: u64,
    num_ticks: u64,
    amount: u128,
    seller_shares: u128,
) -> Option<FillPlan> {
    if price == 0 || price >= num_ticks {
        return None;
    }
    let ticks = num_ticks as u128;
    let maker_buys = maker_side == Side::Bid;

    let transferred = amount.min(seller_shares);
    let minted = amount - transferred;

    // Buyer pays the seller for delivered shares
    let transfer_payment = if maker_buys {
        mul_div_down(transferred, price as u128, ticks)?
    } else {
        mul_div_up(transferred, price as u128, ticks)?
    };

    // Complete-set funding, maker's portion rounded down
    let maker_ticks = if maker_buys { price } else { num_ticks - price };
    let maker_mint = mul_div_down(minted, maker_ticks as u128, ticks)?;
    let taker_mint = minted - maker_mint;

    let (buyer_mint, seller_mint) = if maker_buys {
        (maker_mint, taker_mint)
    } else {
        (taker_mint, maker_mint)
    };

    let o = outcome.index();
    let c = outcome.complement().index();

    let mut buyer_shares_in = [0u128; 2];
    buyer_shares_in[o] = amount;
    let buyer = PartyLegs {
        cash_out: transfer_payment.checked_add(buyer_mint)?,
        cash_in: 0,
        shares_out: [0, 0],
        shares_in: buyer_shares_in,
    };

    let mut seller_shares_out = [0u128; 2];
    seller_shares_out[o] = transferred;
    let mut seller_shares_in = [0u128; 2];
    seller_shares_in[c] = minted;
    let seller = PartyLegs {
        cash_out: seller_mint,
        cash_in: transfer_payment,
        shares_out: seller_shares_out,
        shares_in: seller_shares_in,
    };

    let (maker, taker) = if maker_buys { (buyer, seller) } else { (seller, buyer) };

    Some(FillPlan {
        amount,
        transferred,
        minted,
        maker,
        taker,
        collateral: minted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::amount::fix;

    fn cash_conserved(plan: &FillPlan) -> bool {
        let paid = plan.maker.cash_out + plan.taker.cash_out;
        let received = plan.maker.cash_in + plan.taker.cash_in + plan.collateral;
        paid == received
    }

    #[test]
    fn test_bid_maker_mints_complete_sets() {
        // Maker bids YES at 60, taker holds nothing
        let plan = plan_fill(Side::Bid, Outcome::Yes, 60, 100, fix(1), 0).unwrap();

        assert_eq!(plan.minted, fix(1));
        assert_eq!(plan.transferred, 0);
        assert_eq!(plan.maker.cash_out, 600_000_000_000_000_000);
        assert_eq!(plan.taker.cash_out, 400_000_000_000_000_000);
        assert_eq!(plan.maker.shares_in, [0, fix(1)]);
        assert_eq!(plan.taker.shares_in, [fix(1), 0]);
        assert_eq!(plan.collateral, fix(1));
        assert!(cash_conserved(&plan));
    }

    #[test]
    fn test_ask_maker_mints_complete_sets() {
        // Maker asks YES at 60: maker funds the NO side at 40
        let plan = plan_fill(Side::Ask, Outcome::Yes, 60, 100, fix(1), 0).unwrap();

        assert_eq!(plan.maker.cash_out, 400_000_000_000_000_000);
        assert_eq!(plan.taker.cash_out, 600_000_000_000_000_000);
        assert_eq!(plan.maker.shares_in, [fix(1), 0]);
        assert_eq!(plan.taker.shares_in, [0, fix(1)]);
        assert!(cash_conserved(&plan));
    }

    #[test]
    fn test_seller_shares_are_transferred_first() {
        // Taker sells 3 of the 10 YES shares it holds into a bid
        let plan = plan_fill(Side::Bid, Outcome::Yes, 60, 100, 10, 3).unwrap();

        assert_eq!(plan.transferred, 3);
        assert_eq!(plan.minted, 7);
        assert_eq!(plan.taker.shares_out, [0, 3]);
        // floor(3 * 0.6) = 1 for the transfer, floor(7 * 0.6) = 4 for minting
        assert_eq!(plan.maker.cash_out, 1 + 4);
        assert_eq!(plan.taker.cash_in, 1);
        assert_eq!(plan.taker.cash_out, 3);
        assert_eq!(plan.taker.shares_in, [7, 0]);
        assert_eq!(plan.maker.shares_in, [0, 10]);
        assert!(cash_conserved(&plan));
    }

    #[test]
    fn test_pure_transfer_mints_nothing() {
        let plan = plan_fill(Side::Bid, Outcome::No, 25, 100, fix(2), fix(5)).unwrap();
        assert_eq!(plan.minted, 0);
        assert_eq!(plan.collateral, 0);
        assert_eq!(plan.maker.cash_out, 500_000_000_000_000_000);
        assert_eq!(plan.taker.cash_in, 500_000_000_000_000_000);
        assert_eq!(plan.taker.shares_out, [fix(2), 0]);
    }

    #[test]
    fn test_rounding_favours_maker() {
        // Maker pays: rounded down
        let bid = plan_fill(Side::Bid, Outcome::Yes, 60, 100, 7, 0).unwrap();
        assert_eq!(bid.maker.cash_out, 4); // floor(4.2)
        assert_eq!(bid.taker.cash_out, 3);

        let ask = plan_fill(Side::Ask, Outcome::Yes, 60, 100, 7, 0).unwrap();
        assert_eq!(ask.maker.cash_out, 2); // floor(2.8)
        assert_eq!(ask.taker.cash_out, 5);

        // Maker receives: rounded up
        let ask_transfer = plan_fill(Side::Ask, Outcome::Yes, 60, 100, 7, 7).unwrap();
        assert_eq!(ask_transfer.maker.cash_in, 5); // ceil(4.2)
        assert_eq!(ask_transfer.taker.cash_out, 5);

        // Taker receives from a bidding maker: rounded down
        let bid_transfer = plan_fill(Side::Bid, Outcome::Yes, 60, 100, 7, 7).unwrap();
        assert_eq!(bid_transfer.taker.cash_in, 4);

        for plan in [bid, ask, ask_transfer, bid_transfer] {
            assert!(cash_conserved(&plan));
        }
    }

    #[test]
    fn test_invalid_price_or_overflow() {
        assert!(plan_fill(Side::Bid, Outcome::Yes, 0, 100, 1, 0).is_none());
        assert!(plan_fill(Side::Bid, Outcome::Yes, 100, 100, 1, 0).is_none());
        assert!(plan_fill(Side::Bid, Outcome::Yes, 60, 100, u128::MAX, 0).is_none());
    }
}
