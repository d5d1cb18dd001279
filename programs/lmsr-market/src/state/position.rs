use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{constants::OUTCOME_COUNT, error::MarketError};

/// Per (user, market) holdings
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPosition {
    pub user: Pubkey,
    pub market_id: u64,
    pub shares: [u128; OUTCOME_COUNT],
    /// Cumulative value paid for shares, fees included
    pub amount_spent: u128,
    pub lp_tokens: u128,
    pub claimed: bool,
}

impl UserPosition {
    pub fn new(user: Pubkey, market_id: u64) -> Self {
        Self {
            user,
            market_id,
            ..Self::default()
        }
    }

    pub fn credit_shares(&mut self, outcome: u8, amount: u128) -> Result<(), MarketError> {
        let slot = self
            .shares
            .get_mut(outcome as usize)
            .ok_or(MarketError::InvalidOutcome)?;
        *slot = slot.checked_add(amount).ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn debit_shares(&mut self, outcome: u8, amount: u128) -> Result<(), MarketError> {
        let slot = self
            .shares
            .get_mut(outcome as usize)
            .ok_or(MarketError::InvalidOutcome)?;
        *slot = slot.checked_sub(amount).ok_or(MarketError::InsufficientShares)?;
        Ok(())
    }

    /// Mark the position claimed and clear all shares; only once
    pub fn mark_claimed(&mut self) -> Result<[u128; OUTCOME_COUNT], MarketError> {
        if self.claimed {
            return Err(MarketError::AlreadyClaimed);
        }
        self.claimed = true;
        Ok(std::mem::take(&mut self.shares))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_only_once() {
        let mut position = UserPosition::new(Pubkey::new_unique(), 7);
        position.credit_shares(0, 5).unwrap();
        position.credit_shares(1, 3).unwrap();
        assert_eq!(position.mark_claimed().unwrap(), [5, 3]);
        assert_eq!(position.shares, [0, 0]);
        assert_eq!(position.mark_claimed(), Err(MarketError::AlreadyClaimed));
    }

    #[test]
    fn test_debit_beyond_balance() {
        let mut position = UserPosition::new(Pubkey::new_unique(), 7);
        position.credit_shares(1, 2).unwrap();
        assert_eq!(position.debit_shares(1, 3), Err(MarketError::InsufficientShares));
        assert_eq!(position.credit_shares(2, 1), Err(MarketError::InvalidOutcome));
    }
}
