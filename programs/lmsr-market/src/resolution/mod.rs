//! Resolution policies
//!
//! The engine is shared by both market variants. A policy decides how
//! trades move the ledger buckets, how payout-per-share is derived once the
//! outcome is final, and what happens to the pool at finalization.

pub mod risk_sharing;
pub mod zero_sum;

pub use risk_sharing::RiskSharing;
pub use zero_sum::ZeroSum;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{
    error::MarketError,
    state::{FundSeparation, LedgerBuckets, LedgerDelta, Market},
};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionVariant {
    /// LPs absorb trading profit and loss
    RiskSharing,
    /// Winners split only what losing traders paid in
    ZeroSum,
}

/// Value movement of a sell, split by destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellFlow {
    /// C(before) - C(after)
    pub base_value: u128,
    /// Leaves custody: net payout plus protocol fee
    pub outflow: u128,
    /// Stays in the pool as fee growth
    pub lp_fee: u128,
}

pub trait ResolutionPolicy {
    fn variant(&self) -> ResolutionVariant;

    /// Bucket changes for a buy of `cost` with `lp_fee` on top
    fn buy_delta(&self, ledger: &LedgerBuckets, cost: u128, lp_fee: u128) -> Result<LedgerDelta, MarketError>;

    /// Bucket changes for a sell
    fn sell_delta(&self, ledger: &LedgerBuckets, flow: &SellFlow) -> Result<LedgerDelta, MarketError>;

    /// Payout per winning share in share units
    fn payout_per_share(&self, ledger: &LedgerBuckets, winning_shares: u128) -> Result<u128, MarketError>;

    /// One-time pool settlement at finalization
    fn settle(
        &self,
        market: &mut Market,
        ledger: &mut LedgerBuckets,
    ) -> Result<Option<FundSeparation>, MarketError>;

    /// Whether LPs may withdraw from a resolved market
    fn lp_exit_ready(&self, market: &Market) -> bool;
}
