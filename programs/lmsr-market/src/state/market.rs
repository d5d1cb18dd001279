//! Market record and lifecycle
//!
//! Status only moves forward: Created -> Active -> Closed -> Resolved.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::{constants::OUTCOME_COUNT, error::MarketError};

/// Market lifecycle status
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MarketStatus {
    /// Created, waiting for the first liquidity deposit
    Created,
    /// Trading and liquidity provision open
    Active,
    /// Outcome proposed, dispute period running
    Closed,
    /// Outcome final, payouts computed
    Resolved,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Market {
    pub id: u64,
    pub title: String,
    pub creator: Pubkey,
    pub created_at: i64,

    /// Trading stops at this timestamp
    pub closing_time: i64,

    /// LMSR liquidity parameter `b`
    pub liquidity_parameter: u128,

    /// LP withdrawals are blocked from `closing_time - lp_lockdown_secs`
    pub lp_lockdown_secs: i64,

    pub manual_oracle: Pubkey,
    pub settlement_adapter: Pubkey,

    /// Outstanding shares per outcome
    pub total_shares: [u128; OUTCOME_COUNT],
    pub total_volume: u128,
    pub total_fees: u128,
    pub lp_token_supply: u128,

    pub status: MarketStatus,
    pub outcome_set: bool,
    pub winning_outcome: u8,
    pub proposal_timestamp: i64,

    /// Payout per winning share, scaled by SHARE_UNIT
    pub payout_per_share: u128,

    pub funds_separated: bool,

    /// Set when the settlement adapter could not source its data
    pub requires_manual_intervention: bool,
}

impl Market {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        title: String,
        creator: Pubkey,
        created_at: i64,
        closing_time: i64,
        liquidity_parameter: u128,
        lp_lockdown_secs: i64,
        manual_oracle: Pubkey,
        settlement_adapter: Pubkey,
    ) -> Self {
        Self {
            id,
            title,
            creator,
            created_at,
            closing_time,
            liquidity_parameter,
            lp_lockdown_secs,
            manual_oracle,
            settlement_adapter,
            total_shares: [0; OUTCOME_COUNT],
            total_volume: 0,
            total_fees: 0,
            lp_token_supply: 0,
            status: MarketStatus::Created,
            outcome_set: false,
            winning_outcome: 0,
            proposal_timestamp: 0,
            payout_per_share: 0,
            funds_separated: false,
            requires_manual_intervention: false,
        }
    }

    /// Advance status, rejecting anything but the next state
    pub fn transition_to(&mut self, next: MarketStatus) -> Result<(), MarketError> {
        let allowed = matches!(
            (self.status, next),
            (MarketStatus::Created, MarketStatus::Active)
                | (MarketStatus::Active, MarketStatus::Closed)
                | (MarketStatus::Closed, MarketStatus::Resolved)
        );
        if !allowed {
            return Err(MarketError::InvalidStatusTransition);
        }
        msg!("Market {} status {:?} -> {:?}", self.id, self.status, next);
        self.status = next;
        Ok(())
    }

    pub fn lockdown_start(&self) -> i64 {
        self.closing_time.saturating_sub(self.lp_lockdown_secs)
    }

    pub fn is_trading_open(&self, now: i64) -> bool {
        self.status == MarketStatus::Active && now < self.closing_time
    }

    pub fn in_lockdown(&self, now: i64) -> bool {
        now >= self.lockdown_start()
    }

    /// Record the winning outcome; it can be set only once
    pub fn set_outcome(&mut self, outcome: u8, now: i64) -> Result<(), MarketError> {
        if self.outcome_set {
            return Err(MarketError::AlreadyProposed);
        }
        if outcome as usize >= OUTCOME_COUNT {
            return Err(MarketError::InvalidOutcome);
        }
        self.transition_to(MarketStatus::Closed)?;
        self.outcome_set = true;
        self.winning_outcome = outcome;
        self.proposal_timestamp = now;
        Ok(())
    }

    pub fn winning_shares(&self) -> u128 {
        self.total_shares[self.winning_outcome as usize]
    }
}
