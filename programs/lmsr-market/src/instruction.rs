use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{engine::CreateMarketParams, error::MarketError, state::EngineConfig};

/// Engine instructions
///
/// The caller identity and clock are supplied by the host alongside the
/// instruction data. Value-carrying instructions state the attached payment.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum MarketInstruction {
    /// Create a market. Caller: authority or authorized creator
    CreateMarket { params: CreateMarketParams },

    /// Deposit LP principal. Caller: provider, attaching `payment`
    AddLiquidity { market_id: u64, payment: u128 },

    /// Burn LP tokens for principal and fees. Caller: provider
    RemoveLiquidity { market_id: u64, lp_amount: u128 },

    /// Caller: trader, attaching `payment`
    BuyShares {
        market_id: u64,
        outcome: u8,
        min_shares: u128,
        payment: u128,
    },

    /// Caller: trader
    SellShares {
        market_id: u64,
        outcome: u8,
        shares: u128,
        min_payout: u128,
    },

    /// Caller: the market's manual oracle
    ProposeResult { market_id: u64, outcome: u8 },

    /// Caller: the market's settlement adapter
    ProposeResultFromExternalOracle { market_id: u64, outcome: u8 },

    /// Caller: settlement adapter or manual oracle
    FlagManualIntervention { market_id: u64, reason: String },

    /// Caller: anyone
    Finalize { market_id: u64 },

    /// Caller: position holder
    ClaimWinnings { market_id: u64 },

    /// Caller: authority
    SetCreator { creator: Pubkey, allowed: bool },

    /// Caller: authority
    UpdateConfig { config: EngineConfig },

    /// Caller: authority
    WithdrawProtocolFees { recipient: Pubkey, amount: u128 },
}

impl MarketInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|err| {
            msg!("Invalid instruction data: {}", err);
            MarketError::InvalidInstruction.into()
        })
    }

    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        self.try_to_vec().map_err(|_| MarketError::InvalidInstruction.into())
    }
}
