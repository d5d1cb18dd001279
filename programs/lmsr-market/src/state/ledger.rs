//! Per-market accounting ledger
//!
//! `total_pool` is the value actually held for the market. The other
//! buckets are virtual claims on it:
//!
//! ```text
//! principal + fees + outcome_funds <= total_pool
//! ```
//!
//! `outcome_funds` is the reserved winner payout in the risk-sharing
//! variant and the user trading funds in the zero-sum variant. Any excess
//! of the buckets over the pool above the tolerance is fatal. Excess within
//! tolerance is integer-division dust and is absorbed by shrinking fees,
//! then outcome funds, never by growing the pool.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::msg;

use crate::{constants::PPM_DENOMINATOR, error::MarketError, math::mul_div};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerBuckets {
    pub total_pool: u128,
    pub principal: u128,
    pub fees: u128,
    pub outcome_funds: u128,
    /// Cumulative dust absorbed by the tolerance rule
    pub rounding_adjustments: u128,
}

/// Signed change to each bucket, applied as one unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerDelta {
    pub pool: i128,
    pub principal: i128,
    pub fees: i128,
    pub outcome_funds: i128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvariantTolerance {
    pub min_wei: u128,
    pub ppm: u128,
}

impl InvariantTolerance {
    /// Greater of the fixed floor and the proportional allowance
    pub fn for_pool(&self, pool: u128) -> u128 {
        let proportional = mul_div(pool, self.ppm, PPM_DENOMINATOR).unwrap_or(u128::MAX);
        self.min_wei.max(proportional)
    }
}

/// Result of a one-time fund separation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundSeparation {
    pub reserved_for_winners: u128,
    pub lp_bucket: u128,
}

pub fn to_delta(amount: u128) -> Result<i128, MarketError> {
    i128::try_from(amount).map_err(|_| MarketError::ArithmeticOverflow)
}

fn apply_signed(value: u128, delta: i128) -> Result<u128, MarketError> {
    if delta >= 0 {
        value
            .checked_add(delta.unsigned_abs())
            .ok_or(MarketError::ArithmeticOverflow)
    } else {
        value
            .checked_sub(delta.unsigned_abs())
            .ok_or(MarketError::LedgerUnderflow)
    }
}

impl LedgerBuckets {
    pub fn virtual_total(&self) -> Result<u128, MarketError> {
        self.principal
            .checked_add(self.fees)
            .and_then(|v| v.checked_add(self.outcome_funds))
            .ok_or(MarketError::ArithmeticOverflow)
    }

    /// Pool value not claimed by any bucket
    pub fn unallocated(&self) -> Result<u128, MarketError> {
        Ok(self.total_pool.saturating_sub(self.virtual_total()?))
    }

    /// Apply a multi-bucket delta atomically and re-check the invariant
    ///
    /// Order: principal, fees, outcome funds, then pool. On error `self` is
    /// untouched. Returns the dust absorbed, if any.
    pub fn apply(
        &mut self,
        delta: &LedgerDelta,
        tolerance: &InvariantTolerance,
    ) -> Result<u128, MarketError> {
        let mut next = self.clone();
        next.principal = apply_signed(next.principal, delta.principal)?;
        next.fees = apply_signed(next.fees, delta.fees)?;
        next.outcome_funds = apply_signed(next.outcome_funds, delta.outcome_funds)?;
        next.total_pool = apply_signed(next.total_pool, delta.pool)?;

        let absorbed = next.enforce_invariant(tolerance)?;
        *self = next;
        Ok(absorbed)
    }

    fn enforce_invariant(&mut self, tolerance: &InvariantTolerance) -> Result<u128, MarketError> {
        let virtual_total = self.virtual_total()?;
        if virtual_total <= self.total_pool {
            return Ok(0);
        }

        let excess = virtual_total - self.total_pool;
        let allowed = tolerance.for_pool(self.total_pool);
        if excess > allowed {
            msg!(
                "Ledger invariant violated: buckets {} pool {} excess {} tolerance {}",
                virtual_total,
                self.total_pool,
                excess,
                allowed
            );
            return Err(MarketError::LedgerInvariantViolation);
        }

        let mut remaining = excess;
        let from_fees = remaining.min(self.fees);
        self.fees -= from_fees;
        remaining -= from_fees;

        let from_outcome = remaining.min(self.outcome_funds);
        self.outcome_funds -= from_outcome;
        remaining -= from_outcome;

        if remaining > 0 {
            return Err(MarketError::LedgerInvariantViolation);
        }

        self.rounding_adjustments = self.rounding_adjustments.saturating_add(excess);
        msg!("Ledger absorbed {} wei of rounding dust", excess);
        Ok(excess)
    }

    /// Strict check used after operations that assign buckets directly
    pub fn check_invariant(&self, tolerance: &InvariantTolerance) -> Result<(), MarketError> {
        let virtual_total = self.virtual_total()?;
        if virtual_total > self.total_pool.saturating_add(tolerance.for_pool(self.total_pool)) {
            return Err(MarketError::LedgerInvariantViolation);
        }
        Ok(())
    }

    /// Split the pool into a winner bucket and an LP bucket, once
    ///
    /// Principal and fees are rescaled so that their sum equals the LP
    /// bucket exactly.
    pub fn separate(&mut self, required_for_winners: u128) -> Result<FundSeparation, MarketError> {
        let reserved = required_for_winners.min(self.total_pool);
        let lp_bucket = self.total_pool - reserved;

        let old_lp_total = self
            .principal
            .checked_add(self.fees)
            .ok_or(MarketError::ArithmeticOverflow)?;
        let principal = if old_lp_total == 0 {
            lp_bucket
        } else {
            mul_div(lp_bucket, self.principal, old_lp_total)?
        };

        self.outcome_funds = reserved;
        self.principal = principal;
        self.fees = lp_bucket - principal;

        Ok(FundSeparation {
            reserved_for_winners: reserved,
            lp_bucket,
        })
    }
}
