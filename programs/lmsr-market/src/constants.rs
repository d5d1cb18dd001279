//! Fixed-point scales and default policy values

/// One outcome share, and the scale of payout-per-share ratios
pub const SHARE_UNIT: u128 = 1_000_000_000_000_000_000;

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Parts-per-million denominator for invariant tolerance
pub const PPM_DENOMINATOR: u128 = 1_000_000;

/// Largest accepted `max(s0, s1) / b`
pub const MAX_EXP_INPUT_RATIO: u128 = 100;

/// Number of outcomes in a binary market
pub const OUTCOME_COUNT: usize = 2;

/// Combined fee rate ceiling (10%)
pub const MAX_TOTAL_FEE_BPS: u16 = 1_000;

// Defaults for EngineConfig
pub const DEFAULT_PROTOCOL_FEE_BPS: u16 = 50;
pub const DEFAULT_LP_FEE_BPS: u16 = 50;
pub const DEFAULT_MIN_TRADE_WEI: u128 = 1_000_000_000_000;
pub const DEFAULT_MAX_TRADE_WEI: u128 = 1_000_000 * SHARE_UNIT;
pub const DEFAULT_MIN_INITIAL_LIQUIDITY_WEI: u128 = 10_000_000_000_000_000;
pub const DEFAULT_MIN_PRINCIPAL_RESERVE_WEI: u128 = 1_000_000_000_000_000;
pub const DEFAULT_MIN_LIQUIDITY_PARAMETER: u128 = 1_000_000_000_000_000;
pub const DEFAULT_MAX_LIQUIDITY_PARAMETER: u128 = 1_000_000_000 * SHARE_UNIT;
pub const DEFAULT_DISPUTE_PERIOD_SECS: i64 = 86_400;
pub const DEFAULT_MAX_TITLE_LEN: u16 = 256;
pub const DEFAULT_TOLERANCE_MIN_WEI: u128 = 1_000;
pub const DEFAULT_TOLERANCE_PPM: u128 = 1;
