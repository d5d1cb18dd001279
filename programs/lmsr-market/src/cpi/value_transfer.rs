//! Outbound value transfers from engine custody

use std::collections::HashMap;

use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

pub trait ValueTransfer {
    /// Send `amount` from engine custody to `recipient`
    fn transfer(&mut self, recipient: &Pubkey, amount: u128) -> ProgramResult;
}

/// Records payouts per recipient
#[derive(Debug, Default, Clone)]
pub struct InMemoryTreasury {
    received: HashMap<Pubkey, u128>,
    total_paid_out: u128,
}

impl InMemoryTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self, recipient: &Pubkey) -> u128 {
        self.received.get(recipient).copied().unwrap_or(0)
    }

    pub fn total_paid_out(&self) -> u128 {
        self.total_paid_out
    }
}

impl ValueTransfer for InMemoryTreasury {
    fn transfer(&mut self, recipient: &Pubkey, amount: u128) -> ProgramResult {
        let received = self.received.entry(*recipient).or_insert(0);
        *received = received
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        self.total_paid_out = self
            .total_paid_out
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        Ok(())
    }
}
