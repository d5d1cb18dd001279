//! Effect journal
//!
//! Token mints and burns issued during one operation are recorded so that
//! a later failure can undo them. Value transfers are always the last
//! effect of an operation and are never journaled.

use solana_program::{msg, pubkey::Pubkey};

use crate::cpi::{TokenId, TokenLedger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Minted { owner: Pubkey, id: TokenId, amount: u128 },
    Burned { owner: Pubkey, id: TokenId, amount: u128 },
}

#[derive(Debug, Default, Clone)]
pub struct Journal {
    effects: Vec<Effect>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Undo every recorded effect, newest first
    ///
    /// Compensation failures are logged and skipped; there is nothing left
    /// to roll back to.
    pub fn compensate<T: TokenLedger>(&mut self, tokens: &mut T) {
        while let Some(effect) = self.effects.pop() {
            let result = match effect {
                Effect::Minted { owner, id, amount } => tokens.burn(&owner, id, amount),
                Effect::Burned { owner, id, amount } => tokens.mint(&owner, id, amount),
            };
            if let Err(err) = result {
                msg!("Compensation of {:?} failed: {:?}", effect, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpi::InMemoryTokenLedger;

    #[test]
    fn test_compensation_restores_balances() {
        let mut tokens = InMemoryTokenLedger::new();
        let owner = Pubkey::new_unique();
        let shares = TokenId::outcome(1, 0);
        let lp = TokenId::liquidity(1);
        tokens.mint(&owner, lp, 50).unwrap();

        let mut journal = Journal::new();
        tokens.mint(&owner, shares, 10).unwrap();
        journal.record(Effect::Minted { owner, id: shares, amount: 10 });
        tokens.burn(&owner, lp, 20).unwrap();
        journal.record(Effect::Burned { owner, id: lp, amount: 20 });
        assert_eq!(journal.len(), 2);

        journal.compensate(&mut tokens);
        assert!(journal.is_empty());
        assert_eq!(tokens.balance_of(&owner, shares), 0);
        assert_eq!(tokens.balance_of(&owner, lp), 50);
    }
}
