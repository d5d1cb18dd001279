//! Math module
//!
//! Fixed-point primitives and the LMSR pricing core built on them

pub mod fixed_point;
pub mod lmsr;
pub mod u256;

pub use fixed_point::{exp_neg_wad, ln_wad, LN2_WAD, WAD};
pub use lmsr::{buy_cost, buy_within_budget, check_bounds, cost_function, prices, sell_value, BuyQuote};
pub use u256::{mul_div, U256};

use crate::{constants::BPS_DENOMINATOR, error::MarketError};

/// Fraction of `value` expressed in basis points, rounded down
pub fn apply_bps(value: u128, bps: u16) -> Result<u128, MarketError> {
    mul_div(value, bps as u128, BPS_DENOMINATOR)
}
