//! WAD fixed-point transcendental functions
//!
//! Values are u128 scaled by 1e18. The LMSR only ever needs `e^(-x)` for
//! `x >= 0` and `ln(y)` for `y >= 1`, so both functions are restricted to
//! those domains and never produce values above their inputs' scale.

use crate::error::MarketError;

/// 1.0 in WAD
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// ln(2) in WAD
pub const LN2_WAD: u128 = 693_147_180_559_945_309;

/// Beyond this argument e^(-x) is below one WAD unit
const EXP_NEG_ZERO_CUTOFF: u128 = 42 * WAD;

const MAX_SERIES_TERMS: u128 = 64;

/// e^(-x) for x >= 0, in WAD
///
/// Range reduction: x = k·ln2 + r with r in [0, ln2), so
/// e^(-x) = e^(-r) / 2^k and e^r is a short Taylor series.
pub fn exp_neg_wad(x: u128) -> Result<u128, MarketError> {
    if x == 0 {
        return Ok(WAD);
    }
    if x >= EXP_NEG_ZERO_CUTOFF {
        return Ok(0);
    }

    let k = x / LN2_WAD;
    let r = x - k * LN2_WAD;

    // e^r in [1, 2)
    let mut sum = WAD;
    let mut term = WAD;
    for i in 1..MAX_SERIES_TERMS {
        term = term
            .checked_mul(r)
            .ok_or(MarketError::ArithmeticOverflow)?
            / WAD
            / i;
        if term == 0 {
            break;
        }
        sum = sum.checked_add(term).ok_or(MarketError::ArithmeticOverflow)?;
    }

    let exp_neg_r = (WAD * WAD) / sum;
    Ok(exp_neg_r >> k)
}

/// ln(y) for y >= 1, in WAD
///
/// Halves y into [1, 2) counting k, then uses
/// ln(m) = 2·atanh((m - 1) / (m + 1)) which converges fast for z < 1/3.
pub fn ln_wad(y: u128) -> Result<u128, MarketError> {
    if y < WAD {
        return Err(MarketError::MathDomain);
    }

    let mut k = 0u128;
    let mut m = y;
    while m >= 2 * WAD {
        m /= 2;
        k += 1;
    }

    let z = (m - WAD)
        .checked_mul(WAD)
        .ok_or(MarketError::ArithmeticOverflow)?
        / (m + WAD);
    let z_squared = z * z / WAD;

    let mut sum = 0u128;
    let mut power = z;
    let mut n = 1u128;
    while power > 0 && n < 2 * MAX_SERIES_TERMS {
        sum += power / n;
        power = power * z_squared / WAD;
        n += 2;
    }

    (2 * sum)
        .checked_add(k.checked_mul(LN2_WAD).ok_or(MarketError::ArithmeticOverflow)?)
        .ok_or(MarketError::ArithmeticOverflow)
}
