//! Reentrancy guard
//!
//! One flag for the whole engine. Every mutating entry point enters it
//! before touching state and leaves it after the last collaborator call.

use solana_program::msg;

use crate::error::MarketError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReentrancyState {
    /// Ready for a new operation
    NotEntered,
    /// Operation in progress
    Entered,
}

#[derive(Debug, Clone)]
pub struct ReentrancyGuard {
    pub state: ReentrancyState,
    pub operation_count: u64,
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self {
            state: ReentrancyState::NotEntered,
            operation_count: 0,
        }
    }

    pub fn enter(&mut self) -> Result<(), MarketError> {
        match self.state {
            ReentrancyState::NotEntered => {
                self.state = ReentrancyState::Entered;
                self.operation_count = self.operation_count.saturating_add(1);
                Ok(())
            }
            ReentrancyState::Entered => {
                msg!("Reentrant call rejected during operation {}", self.operation_count);
                Err(MarketError::ReentrantCall)
            }
        }
    }

    pub fn exit(&mut self) {
        self.state = ReentrancyState::NotEntered;
    }

    pub fn is_entered(&self) -> bool {
        self.state == ReentrancyState::Entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_enter_rejected() {
        let mut guard = ReentrancyGuard::new();
        guard.enter().unwrap();
        assert!(guard.is_entered());
        assert_eq!(guard.enter(), Err(MarketError::ReentrantCall));
        guard.exit();
        guard.enter().unwrap();
        assert_eq!(guard.operation_count, 2);
    }
}
