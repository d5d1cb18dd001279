//! Error types for the LMSR market engine
//!
//! Every rejection the engine can produce is a variant of [`MarketError`].
//! Codes are stable so that callers decoding a `ProgramError::Custom` can
//! map back to the variant.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum MarketError {
    // Invalid references (6000-6009)
    #[error("Market not found")]
    MarketNotFound = 6000,

    #[error("Invalid outcome index")]
    InvalidOutcome = 6001,

    #[error("Invalid instruction data")]
    InvalidInstruction = 6002,

    // Authorization (6010-6019)
    #[error("Caller is not the engine authority")]
    Unauthorized = 6010,

    #[error("Caller is not an authorized market creator")]
    UnauthorizedCreator = 6011,

    #[error("Caller is not the configured oracle for this market")]
    UnauthorizedOracle = 6012,

    // Lifecycle state violations (6020-6039)
    #[error("Market is not active")]
    MarketNotActive = 6020,

    #[error("Market trading window has closed")]
    TradingClosed = 6021,

    #[error("Liquidity is locked for this market")]
    LiquidityLocked = 6022,

    #[error("Market has no proposed outcome")]
    MarketNotClosed = 6023,

    #[error("Market is not resolved")]
    MarketNotResolved = 6024,

    #[error("Dispute period has not elapsed")]
    DisputePeriodActive = 6025,

    #[error("Outcome proposed before closing time")]
    ProposalTooEarly = 6026,

    #[error("Resolved funds have not been separated")]
    FundsNotSeparated = 6027,

    #[error("Market requires manual intervention")]
    ManualInterventionRequired = 6028,

    #[error("Illegal market status transition")]
    InvalidStatusTransition = 6029,

    #[error("Re-entrant call rejected")]
    ReentrantCall = 6030,

    // Bounds violations (6040-6059)
    #[error("Trade below minimum size")]
    TradeTooSmall = 6040,

    #[error("Trade above maximum size")]
    TradeTooLarge = 6041,

    #[error("Exponent argument too large")]
    ExponentArgumentTooLarge = 6042,

    #[error("Invalid liquidity parameter")]
    InvalidLiquidityParameter = 6043,

    #[error("Initial liquidity below minimum")]
    LiquidityBelowMinimum = 6044,

    #[error("Withdrawal would breach the principal reserve floor")]
    ReserveFloorBreached = 6045,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 6046,

    #[error("Division by zero")]
    DivisionByZero = 6047,

    #[error("Math argument outside function domain")]
    MathDomain = 6048,

    #[error("Invalid market parameters")]
    InvalidMarketParameters = 6049,

    #[error("Invalid engine configuration")]
    InvalidConfig = 6050,

    #[error("Amount must be non-zero")]
    ZeroAmount = 6051,

    // Insufficient funds (6060-6069)
    #[error("Insufficient outcome shares")]
    InsufficientShares = 6060,

    #[error("Insufficient liquidity tokens")]
    InsufficientLpTokens = 6061,

    #[error("Pool cannot cover the requested outflow")]
    InsufficientPoolBalance = 6062,

    #[error("Payment does not cover cost and fees")]
    InsufficientPayment = 6063,

    #[error("Insufficient protocol fee balance")]
    InsufficientProtocolFees = 6064,

    #[error("Nothing to claim")]
    NothingToClaim = 6065,

    // Slippage (6070-6079)
    #[error("Slippage tolerance exceeded")]
    SlippageExceeded = 6070,

    // Already done (6080-6089)
    #[error("Outcome already proposed")]
    AlreadyProposed = 6080,

    #[error("Market already finalized")]
    AlreadyFinalized = 6081,

    #[error("Winnings already claimed")]
    AlreadyClaimed = 6082,

    #[error("Funds already separated")]
    FundsAlreadySeparated = 6083,

    // Ledger invariant violations (6090-6099)
    #[error("Ledger buckets exceed custodial pool beyond tolerance")]
    LedgerInvariantViolation = 6090,

    #[error("Reserved payout bucket cannot cover claim")]
    ReservedFundsExhausted = 6091,

    #[error("Ledger bucket underflow")]
    LedgerUnderflow = 6092,

    // External collaborators (6100-6109)
    #[error("External collaborator unavailable")]
    CollaboratorUnavailable = 6100,
}

/// Coarse classification callers branch on
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidReference,
    Unauthorized,
    StateViolation,
    BoundsViolation,
    InsufficientFunds,
    SlippageViolation,
    AlreadyDone,
    InvariantViolation,
    CollaboratorUnavailable,
}

impl MarketError {
    pub fn kind(&self) -> ErrorKind {
        use MarketError::*;
        match self {
            MarketNotFound | InvalidOutcome | InvalidInstruction => ErrorKind::InvalidReference,
            Unauthorized | UnauthorizedCreator | UnauthorizedOracle => ErrorKind::Unauthorized,
            MarketNotActive | TradingClosed | LiquidityLocked | MarketNotClosed
            | MarketNotResolved | DisputePeriodActive | ProposalTooEarly | FundsNotSeparated
            | ManualInterventionRequired | InvalidStatusTransition | ReentrantCall => {
                ErrorKind::StateViolation
            }
            TradeTooSmall | TradeTooLarge | ExponentArgumentTooLarge
            | InvalidLiquidityParameter | LiquidityBelowMinimum | ReserveFloorBreached
            | ArithmeticOverflow | DivisionByZero | MathDomain | InvalidMarketParameters
            | InvalidConfig | ZeroAmount => ErrorKind::BoundsViolation,
            InsufficientShares | InsufficientLpTokens | InsufficientPoolBalance
            | InsufficientPayment | InsufficientProtocolFees | NothingToClaim => {
                ErrorKind::InsufficientFunds
            }
            SlippageExceeded => ErrorKind::SlippageViolation,
            AlreadyProposed | AlreadyFinalized | AlreadyClaimed | FundsAlreadySeparated => {
                ErrorKind::AlreadyDone
            }
            LedgerInvariantViolation | ReservedFundsExhausted | LedgerUnderflow => {
                ErrorKind::InvariantViolation
            }
            CollaboratorUnavailable => ErrorKind::CollaboratorUnavailable,
        }
    }

    /// Invariant violations mean the ledger can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::InvariantViolation
    }
}

impl PrintProgramError for MarketError {
    fn print<E>(&self) {
        msg!("LMSR Market Error: {}", self);
    }
}

impl From<MarketError> for ProgramError {
    fn from(e: MarketError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for MarketError {
    fn type_of() -> &'static str {
        "MarketError"
    }
}

impl TryFrom<ProgramError> for MarketError {
    type Error = ProgramError;

    fn try_from(error: ProgramError) -> Result<Self, Self::Error> {
        match error {
            ProgramError::Custom(code) => MarketError::from_u32(code).ok_or(error),
            _ => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_error_round_trip() {
        let program_error: ProgramError = MarketError::SlippageExceeded.into();
        assert_eq!(program_error, ProgramError::Custom(6070));
        assert_eq!(
            MarketError::try_from(program_error).unwrap(),
            MarketError::SlippageExceeded
        );
        assert!(MarketError::try_from(ProgramError::Custom(1)).is_err());
    }

    #[test]
    fn test_only_invariant_errors_are_fatal() {
        assert!(MarketError::LedgerInvariantViolation.is_fatal());
        assert!(MarketError::ReservedFundsExhausted.is_fatal());
        assert!(!MarketError::InsufficientPoolBalance.is_fatal());
        assert!(!MarketError::SlippageExceeded.is_fatal());
        assert_eq!(MarketError::AlreadyClaimed.kind(), ErrorKind::AlreadyDone);
    }
}
