//! LMSR pricing core
//!
//! Cost function for a binary market:
//!
//! ```text
//! C(q0, q1) = b · ln(e^(q0/b) + e^(q1/b))
//!           = max(q0, q1) + b · ln(1 + e^(-|q0 - q1| / b))
//! ```
//!
//! The second form is what gets evaluated: the only exponential taken is
//! of a non-positive argument, so nothing can overflow once the inputs
//! pass [`check_bounds`]. Prices are the gradient of C and are returned in
//! share units so that `p0 + p1 == SHARE_UNIT` exactly.

use solana_program::msg;

use crate::{
    constants::{MAX_EXP_INPUT_RATIO, OUTCOME_COUNT, SHARE_UNIT},
    error::MarketError,
    math::{
        fixed_point::{exp_neg_wad, ln_wad, WAD},
        u256::mul_div,
    },
};

/// Shares and exact cost returned by [`buy_within_budget`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyQuote {
    pub shares: u128,
    pub cost: u128,
}

/// Reject inventories whose exponent argument `max(s0, s1) / b` passes the ceiling
///
/// Compared as `max > k·b` so the check itself cannot overflow.
pub fn check_bounds(s0: u128, s1: u128, b: u128) -> Result<(), MarketError> {
    if b == 0 {
        return Err(MarketError::InvalidLiquidityParameter);
    }
    let largest = s0.max(s1);
    match MAX_EXP_INPUT_RATIO.checked_mul(b) {
        Some(limit) if largest > limit => Err(MarketError::ExponentArgumentTooLarge),
        _ => Ok(()),
    }
}

/// Largest inventory of a single outcome accepted for this `b`
pub fn share_ceiling(b: u128) -> u128 {
    MAX_EXP_INPUT_RATIO.checked_mul(b).unwrap_or(u128::MAX)
}

fn validate_outcome(outcome: u8) -> Result<usize, MarketError> {
    let index = outcome as usize;
    if index >= OUTCOME_COUNT {
        return Err(MarketError::InvalidOutcome);
    }
    Ok(index)
}

/// e^(-|s0 - s1| / b) in WAD
fn relative_weight(s0: u128, s1: u128, b: u128) -> Result<u128, MarketError> {
    let gap = s0.abs_diff(s1);
    let ratio = mul_div(gap, WAD, b)?;
    exp_neg_wad(ratio)
}

/// C(s0, s1) in value units
pub fn cost_function(s0: u128, s1: u128, b: u128) -> Result<u128, MarketError> {
    check_bounds(s0, s1, b)?;

    let weight = relative_weight(s0, s1, b)?;
    let log_term = ln_wad(WAD.checked_add(weight).ok_or(MarketError::ArithmeticOverflow)?)?;
    let smoothing = mul_div(b, log_term, WAD)?;

    s0.max(s1)
        .checked_add(smoothing)
        .ok_or(MarketError::ArithmeticOverflow)
}

/// Instantaneous prices `(p0, p1)` in share units, summing to `SHARE_UNIT`
pub fn prices(s0: u128, s1: u128, b: u128) -> Result<(u128, u128), MarketError> {
    check_bounds(s0, s1, b)?;

    let weight = relative_weight(s0, s1, b)?;
    let denominator = SHARE_UNIT
        .checked_add(mul_div(weight, SHARE_UNIT, WAD)?)
        .ok_or(MarketError::ArithmeticOverflow)?;
    let leading = mul_div(SHARE_UNIT, SHARE_UNIT, denominator)?;
    let trailing = SHARE_UNIT - leading;

    if s0 >= s1 {
        Ok((leading, trailing))
    } else {
        Ok((trailing, leading))
    }
}

fn with_delta(s0: u128, s1: u128, outcome: usize, add: bool, amount: u128) -> Result<(u128, u128), MarketError> {
    let mut shares = [s0, s1];
    shares[outcome] = if add {
        shares[outcome].checked_add(amount).ok_or(MarketError::ArithmeticOverflow)?
    } else {
        shares[outcome].checked_sub(amount).ok_or(MarketError::InsufficientShares)?
    };
    Ok((shares[0], shares[1]))
}

/// Cost of buying exactly `shares` of `outcome`: C(after) - C(before)
pub fn buy_cost(s0: u128, s1: u128, outcome: u8, b: u128, shares: u128) -> Result<u128, MarketError> {
    let index = validate_outcome(outcome)?;
    let before = cost_function(s0, s1, b)?;
    let (n0, n1) = with_delta(s0, s1, index, true, shares)?;
    let after = cost_function(n0, n1, b)?;
    Ok(after.saturating_sub(before))
}

/// Value released by redeeming `shares` of `outcome`: C(before) - C(after)
pub fn sell_value(s0: u128, s1: u128, outcome: u8, b: u128, shares: u128) -> Result<u128, MarketError> {
    let index = validate_outcome(outcome)?;
    let before = cost_function(s0, s1, b)?;
    let (n0, n1) = with_delta(s0, s1, index, false, shares)?;
    let after = cost_function(n0, n1, b)?;
    Ok(before.saturating_sub(after))
}

/// Largest whole number of shares whose cost fits in `budget`
///
/// Bisection over `[0, hi]`. Since C >= max(q) and
/// C(s) <= max(s) + b·ln2, buying n shares of outcome i costs at least
/// `n - (max - s_i) - b`, giving `hi = budget + (max - s_i) + b`. When
/// `total_liquidity > 0` the bound is clamped so that shares never exceed
/// `budget + total_liquidity`.
///
/// A budget that would carry outcome i past the exponent ceiling is
/// rejected with `ExponentArgumentTooLarge` rather than filled up to it.
pub fn buy_within_budget(
    s0: u128,
    s1: u128,
    outcome: u8,
    b: u128,
    budget: u128,
    total_liquidity: u128,
) -> Result<BuyQuote, MarketError> {
    let index = validate_outcome(outcome)?;
    check_bounds(s0, s1, b)?;

    if budget == 0 {
        return Ok(BuyQuote { shares: 0, cost: 0 });
    }

    let current = [s0, s1][index];
    let gap = s0.max(s1) - current;

    let mut hi = budget.saturating_add(gap).saturating_add(b);
    if total_liquidity > 0 {
        hi = hi.min(budget.saturating_add(total_liquidity));
    }

    let base = cost_function(s0, s1, b)?;
    let quote_cost = |shares: u128| -> Result<u128, MarketError> {
        let (n0, n1) = with_delta(s0, s1, index, true, shares)?;
        Ok(cost_function(n0, n1, b)?.saturating_sub(base))
    };

    let headroom = share_ceiling(b) - current;
    if hi > headroom {
        if quote_cost(headroom)? < budget {
            msg!(
                "Budget {} buys past the exponent ceiling ({} shares of headroom)",
                budget,
                headroom
            );
            return Err(MarketError::ExponentArgumentTooLarge);
        }
        hi = headroom;
    }

    let mut lo = 0u128;
    let mut best_cost = 0u128;
    while lo < hi {
        let mid = lo + (hi - lo) / 2 + 1;
        let cost = quote_cost(mid)?;
        if cost <= budget {
            lo = mid;
            best_cost = cost;
        } else {
            hi = mid - 1;
        }
    }

    Ok(BuyQuote {
        shares: lo,
        cost: best_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const B: u128 = 100_000_000_000_000_000; // 0.1 units

    #[test]
    fn test_balanced_market_prices() {
        let (p0, p1) = prices(0, 0, B).unwrap();
        assert_eq!(p0, SHARE_UNIT / 2);
        assert_eq!(p1, SHARE_UNIT / 2);
    }

    #[test]
    fn test_price_moves_toward_bought_outcome() {
        let (p0, p1) = prices(2 * B, 0, B).unwrap();
        assert!(p0 > p1);
        // 1 / (1 + e^-2) ~= 0.8808
        assert!(p0 > 880_000_000_000_000_000 && p0 < 881_000_000_000_000_000);
        let (q0, q1) = prices(0, 2 * B, B).unwrap();
        assert_eq!((q0, q1), (p1, p0));
    }

    #[test]
    fn test_cost_function_at_origin() {
        // C(0, 0) = b·ln2
        let cost = cost_function(0, 0, B).unwrap();
        assert!(cost.abs_diff(B * 693_147_180_559_945_309 / SHARE_UNIT) <= 10);
    }

    #[test]
    fn test_bounds_rejected_not_saturated() {
        assert_eq!(
            prices(MAX_EXP_INPUT_RATIO * B + 1, 0, B),
            Err(MarketError::ExponentArgumentTooLarge)
        );
        assert!(prices(MAX_EXP_INPUT_RATIO * B, 0, B).is_ok());
        assert_eq!(prices(1, 1, 0), Err(MarketError::InvalidLiquidityParameter));
        // k·b overflowing means every u128 inventory is within bounds
        assert!(check_bounds(u128::MAX, 0, u128::MAX / 2).is_ok());
    }

    #[test]
    fn test_buy_within_budget_scenario() {
        let budget = 99_000_000_000_000_000u128;
        let quote = buy_within_budget(0, 0, 0, B, budget, 1_000_000_000_000_000_000).unwrap();
        assert!(quote.shares > 0);
        assert!(quote.cost <= budget);
        // Solving b·ln((e^(n/b) + 1) / 2) = 0.99b gives n ~= 1.4777b
        assert!(quote.shares > 147_000_000_000_000_000);
        assert!(quote.shares < 148_500_000_000_000_000);
        // One more share must not fit
        assert!(buy_cost(0, 0, 0, B, quote.shares + 1).unwrap() > budget);
    }

    #[test]
    fn test_buy_respects_liquidity_cap() {
        let quote = buy_within_budget(0, 0, 1, B, 10 * B, B).unwrap();
        assert!(quote.shares <= 11 * B);
        assert_eq!(buy_within_budget(0, 0, 2, B, B, 0), Err(MarketError::InvalidOutcome));
        assert_eq!(buy_within_budget(0, 0, 0, B, 0, 0).unwrap(), BuyQuote { shares: 0, cost: 0 });
    }

    #[test]
    fn test_budget_past_ceiling_rejected() {
        let b = 1_000_000_000_000_000u128;
        assert_eq!(
            buy_within_budget(0, 0, 0, b, SHARE_UNIT, 0),
            Err(MarketError::ExponentArgumentTooLarge)
        );
        // An outcome already at the ceiling cannot take a single share more
        let ceiling = share_ceiling(b);
        assert_eq!(
            buy_within_budget(ceiling, 0, 0, b, 1_000, 0),
            Err(MarketError::ExponentArgumentTooLarge)
        );
        // The other outcome can still be bought
        let quote = buy_within_budget(ceiling, 0, 1, b, SHARE_UNIT / 10_000, 0).unwrap();
        assert!(quote.shares > 0);
        assert!(quote.cost <= SHARE_UNIT / 10_000);
        // A budget that stops short of the ceiling is filled normally
        let quote = buy_within_budget(0, 0, 0, b, SHARE_UNIT / 20, 0).unwrap();
        assert!(quote.shares < ceiling);
        assert!(quote.cost <= SHARE_UNIT / 20);
    }

    #[test]
    fn test_sell_more_than_inventory_rejected() {
        assert_eq!(sell_value(10, 0, 0, B, 11), Err(MarketError::InsufficientShares));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_prices_sum_to_unit(s0 in 0u128..50 * B, s1 in 0u128..50 * B) {
            let (p0, p1) = prices(s0, s1, B).unwrap();
            prop_assert_eq!(p0 + p1, SHARE_UNIT);
        }

        #[test]
        fn prop_budget_respected(
            s0 in 0u128..20 * B,
            s1 in 0u128..20 * B,
            outcome in 0u8..2,
            budget in 1u128..5 * B,
        ) {
            let quote = buy_within_budget(s0, s1, outcome, B, budget, 0).unwrap();
            prop_assert!(quote.cost <= budget);
        }

        #[test]
        fn prop_round_trip_never_pays_trader(
            s0 in 0u128..20 * B,
            s1 in 0u128..20 * B,
            outcome in 0u8..2,
            shares in 1u128..5 * B,
        ) {
            let cost = buy_cost(s0, s1, outcome, B, shares).unwrap();
            let (n0, n1) = if outcome == 0 { (s0 + shares, s1) } else { (s0, s1 + shares) };
            let value = sell_value(n0, n1, outcome, B, shares).unwrap();
            prop_assert!(cost >= value);
        }
    }
}
