//! Risk-sharing variant
//!
//! Trader money and LP money share one pool. Sells draw from unallocated
//! trading funds first and from principal for the remainder. At
//! finalization the pool pays winners up to one unit per share and the
//! rest becomes the LP bucket.

use solana_program::msg;

use super::{ResolutionPolicy, ResolutionVariant, SellFlow};
use crate::{
    constants::SHARE_UNIT,
    error::MarketError,
    math::mul_div,
    state::{to_delta, FundSeparation, LedgerBuckets, LedgerDelta, Market},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskSharing;

impl ResolutionPolicy for RiskSharing {
    fn variant(&self) -> ResolutionVariant {
        ResolutionVariant::RiskSharing
    }

    fn buy_delta(&self, _ledger: &LedgerBuckets, cost: u128, lp_fee: u128) -> Result<LedgerDelta, MarketError> {
        let inflow = cost.checked_add(lp_fee).ok_or(MarketError::ArithmeticOverflow)?;
        Ok(LedgerDelta {
            pool: to_delta(inflow)?,
            fees: to_delta(lp_fee)?,
            ..LedgerDelta::default()
        })
    }

    fn sell_delta(&self, ledger: &LedgerBuckets, flow: &SellFlow) -> Result<LedgerDelta, MarketError> {
        if ledger.total_pool < flow.outflow {
            return Err(MarketError::InsufficientPoolBalance);
        }

        let trading_funds = ledger.unallocated()?;
        let shortfall = flow.base_value.saturating_sub(trading_funds);
        if shortfall > ledger.principal {
            return Err(MarketError::InsufficientPoolBalance);
        }
        if shortfall > 0 {
            msg!("Sell draws {} from LP principal", shortfall);
        }

        Ok(LedgerDelta {
            pool: -to_delta(flow.outflow)?,
            principal: -to_delta(shortfall)?,
            fees: to_delta(flow.lp_fee)?,
            outcome_funds: 0,
        })
    }

    /// One full unit while the pool covers every winning share, pro rata otherwise
    fn payout_per_share(&self, ledger: &LedgerBuckets, winning_shares: u128) -> Result<u128, MarketError> {
        if ledger.total_pool >= winning_shares {
            return Ok(SHARE_UNIT);
        }
        mul_div(ledger.total_pool, SHARE_UNIT, winning_shares)
    }

    fn settle(
        &self,
        market: &mut Market,
        ledger: &mut LedgerBuckets,
    ) -> Result<Option<FundSeparation>, MarketError> {
        if market.funds_separated {
            return Err(MarketError::FundsAlreadySeparated);
        }

        let owed = mul_div(market.winning_shares(), market.payout_per_share, SHARE_UNIT)?;
        let separation = ledger.separate(owed)?;
        market.funds_separated = true;

        msg!(
            "Market {} funds separated: winners {} lp {}",
            market.id,
            separation.reserved_for_winners,
            separation.lp_bucket
        );
        Ok(Some(separation))
    }

    fn lp_exit_ready(&self, market: &Market) -> bool {
        market.funds_separated
    }
}
