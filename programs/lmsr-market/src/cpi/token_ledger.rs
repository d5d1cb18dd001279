//! Outcome and LP token ledger boundary
//!
//! Positions live in an external multi-token ledger. The engine only ever
//! mints and burns; there is no transfer entry point, so shares and LP
//! tokens cannot move between holders outside the engine.

use std::collections::HashMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{entrypoint::ProgramResult, msg, program_error::ProgramError, pubkey::Pubkey};

/// Multi-token id
///
/// Outcome tokens: `market_id << 8 | outcome`. LP tokens: the high bit set
/// with the market id in the low bits. The two ranges never overlap.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u128);

impl TokenId {
    pub const LIQUIDITY_MARKER: u128 = 1 << 127;

    pub fn outcome(market_id: u64, outcome: u8) -> Self {
        Self(((market_id as u128) << 8) | outcome as u128)
    }

    pub fn liquidity(market_id: u64) -> Self {
        Self(Self::LIQUIDITY_MARKER | market_id as u128)
    }

    pub fn is_liquidity(&self) -> bool {
        self.0 & Self::LIQUIDITY_MARKER != 0
    }

    pub fn market_id(&self) -> u64 {
        if self.is_liquidity() {
            (self.0 & !Self::LIQUIDITY_MARKER) as u64
        } else {
            (self.0 >> 8) as u64
        }
    }
}

pub trait TokenLedger {
    fn mint(&mut self, owner: &Pubkey, id: TokenId, amount: u128) -> ProgramResult;

    fn burn(&mut self, owner: &Pubkey, id: TokenId, amount: u128) -> ProgramResult;

    fn balance_of(&self, owner: &Pubkey, id: TokenId) -> u128;
}

/// Ledger held in process memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryTokenLedger {
    balances: HashMap<(Pubkey, TokenId), u128>,
    supply: HashMap<TokenId, u128>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self, id: TokenId) -> u128 {
        self.supply.get(&id).copied().unwrap_or(0)
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn mint(&mut self, owner: &Pubkey, id: TokenId, amount: u128) -> ProgramResult {
        let balance = self.balances.entry((*owner, id)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        let supply = self.supply.entry(id).or_insert(0);
        *supply = supply
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        Ok(())
    }

    fn burn(&mut self, owner: &Pubkey, id: TokenId, amount: u128) -> ProgramResult {
        let balance = self.balances.entry((*owner, id)).or_insert(0);
        if *balance < amount {
            msg!("Burn of {} exceeds balance {} for token {:?}", amount, balance, id);
            return Err(ProgramError::InsufficientFunds);
        }
        *balance -= amount;
        let supply = self.supply.entry(id).or_insert(0);
        *supply = supply.saturating_sub(amount);
        Ok(())
    }

    fn balance_of(&self, owner: &Pubkey, id: TokenId) -> u128 {
        self.balances.get(&(*owner, id)).copied().unwrap_or(0)
    }
}
