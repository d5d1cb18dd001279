use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{
    constants::*,
    error::MarketError,
    state::ledger::InvariantTolerance,
};

/// Engine-wide configuration
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Authority that can update config, authorize creators and withdraw protocol fees
    pub authority: Pubkey,

    /// Protocol share of every trade in basis points
    pub protocol_fee_bps: u16,

    /// LP share of every trade in basis points
    pub lp_fee_bps: u16,

    /// Minimum buy payment and minimum sell size
    pub min_trade_wei: u128,

    /// Maximum buy payment
    pub max_trade_wei: u128,

    /// First deposit needed to activate a market
    pub min_initial_liquidity_wei: u128,

    /// Principal that must remain while a market can still trade
    pub min_principal_reserve_wei: u128,

    pub min_liquidity_parameter: u128,
    pub max_liquidity_parameter: u128,

    /// Timelock between an outcome proposal and finalization
    pub dispute_period_secs: i64,

    pub max_title_len: u16,

    /// Fixed floor of the rounding tolerance on ledger invariants
    pub invariant_tolerance_min_wei: u128,

    /// Proportional tolerance in parts per million of the pool
    pub invariant_tolerance_ppm: u128,
}

impl EngineConfig {
    pub fn default(authority: Pubkey) -> Self {
        Self {
            authority,
            protocol_fee_bps: DEFAULT_PROTOCOL_FEE_BPS,
            lp_fee_bps: DEFAULT_LP_FEE_BPS,
            min_trade_wei: DEFAULT_MIN_TRADE_WEI,
            max_trade_wei: DEFAULT_MAX_TRADE_WEI,
            min_initial_liquidity_wei: DEFAULT_MIN_INITIAL_LIQUIDITY_WEI,
            min_principal_reserve_wei: DEFAULT_MIN_PRINCIPAL_RESERVE_WEI,
            min_liquidity_parameter: DEFAULT_MIN_LIQUIDITY_PARAMETER,
            max_liquidity_parameter: DEFAULT_MAX_LIQUIDITY_PARAMETER,
            dispute_period_secs: DEFAULT_DISPUTE_PERIOD_SECS,
            max_title_len: DEFAULT_MAX_TITLE_LEN,
            invariant_tolerance_min_wei: DEFAULT_TOLERANCE_MIN_WEI,
            invariant_tolerance_ppm: DEFAULT_TOLERANCE_PPM,
        }
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        if self.total_fee_bps() >= MAX_TOTAL_FEE_BPS {
            return Err(MarketError::InvalidConfig);
        }
        if self.min_trade_wei == 0 || self.min_trade_wei > self.max_trade_wei {
            return Err(MarketError::InvalidConfig);
        }
        if self.min_liquidity_parameter == 0
            || self.min_liquidity_parameter > self.max_liquidity_parameter
        {
            return Err(MarketError::InvalidConfig);
        }
        if self.dispute_period_secs <= 0 || self.max_title_len == 0 {
            return Err(MarketError::InvalidConfig);
        }
        if self.invariant_tolerance_ppm > PPM_DENOMINATOR {
            return Err(MarketError::InvalidConfig);
        }
        Ok(())
    }

    /// Combined fee rate deducted from a buy budget up front
    pub fn total_fee_bps(&self) -> u16 {
        self.protocol_fee_bps.saturating_add(self.lp_fee_bps)
    }

    pub fn tolerance(&self) -> InvariantTolerance {
        InvariantTolerance {
            min_wei: self.invariant_tolerance_min_wei,
            ppm: self.invariant_tolerance_ppm,
        }
    }
}
