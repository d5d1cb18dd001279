//! Zero-sum variant
//!
//! Every buy cost lands in the user trading funds bucket and every sell is
//! paid from it. Winners split that bucket at resolution, so LP principal
//! and fees never carry outcome risk.

use solana_program::msg;

use super::{ResolutionPolicy, ResolutionVariant, SellFlow};
use crate::{
    constants::SHARE_UNIT,
    error::MarketError,
    math::mul_div,
    state::{to_delta, FundSeparation, LedgerBuckets, LedgerDelta, Market},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroSum;

impl ResolutionPolicy for ZeroSum {
    fn variant(&self) -> ResolutionVariant {
        ResolutionVariant::ZeroSum
    }

    fn buy_delta(&self, _ledger: &LedgerBuckets, cost: u128, lp_fee: u128) -> Result<LedgerDelta, MarketError> {
        let inflow = cost.checked_add(lp_fee).ok_or(MarketError::ArithmeticOverflow)?;
        Ok(LedgerDelta {
            pool: to_delta(inflow)?,
            fees: to_delta(lp_fee)?,
            outcome_funds: to_delta(cost)?,
            ..LedgerDelta::default()
        })
    }

    fn sell_delta(&self, ledger: &LedgerBuckets, flow: &SellFlow) -> Result<LedgerDelta, MarketError> {
        if ledger.outcome_funds < flow.base_value || ledger.total_pool < flow.outflow {
            return Err(MarketError::InsufficientPoolBalance);
        }
        Ok(LedgerDelta {
            pool: -to_delta(flow.outflow)?,
            principal: 0,
            fees: to_delta(flow.lp_fee)?,
            outcome_funds: -to_delta(flow.base_value)?,
        })
    }

    /// Exactly `user_funds / winning_shares`, rounded down
    fn payout_per_share(&self, ledger: &LedgerBuckets, winning_shares: u128) -> Result<u128, MarketError> {
        if winning_shares == 0 {
            return Ok(0);
        }
        mul_div(ledger.outcome_funds, SHARE_UNIT, winning_shares)
    }

    /// With no winning shares the trading funds would be stranded; they go to LPs
    fn settle(
        &self,
        market: &mut Market,
        ledger: &mut LedgerBuckets,
    ) -> Result<Option<FundSeparation>, MarketError> {
        if market.winning_shares() == 0 && ledger.outcome_funds > 0 {
            msg!(
                "Market {} has no winning shares, {} trading funds move to LP fees",
                market.id,
                ledger.outcome_funds
            );
            ledger.fees = ledger
                .fees
                .checked_add(ledger.outcome_funds)
                .ok_or(MarketError::ArithmeticOverflow)?;
            ledger.outcome_funds = 0;
        }
        Ok(None)
    }

    fn lp_exit_ready(&self, _market: &Market) -> bool {
        true
    }
}
