//! Market engine
//!
//! Owns every market record, its ledger and all user positions, and is the
//! only writer of outcome and LP token balances. One engine serves one
//! resolution variant, chosen by its `ResolutionPolicy` parameter.
//!
//! Every mutating entry point runs inside [`MarketEngine::execute`]: the
//! reentrancy guard is entered, the state the operation may touch is
//! snapshotted, and on failure the snapshot is restored and journaled token
//! effects are compensated. Value transfers happen last.

pub mod admin;
pub mod claims;
pub mod guard;
pub mod journal;
pub mod lifecycle;
pub mod liquidity;
pub mod queries;
pub mod trading;

pub use guard::{ReentrancyGuard, ReentrancyState};
pub use journal::{Effect, Journal};
pub use lifecycle::CreateMarketParams;
pub use trading::{BuyReceipt, SellReceipt};

use std::collections::{BTreeMap, BTreeSet};

use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    cpi::{InMemoryTokenLedger, InMemoryTreasury, TokenId, TokenLedger, ValueTransfer},
    error::MarketError,
    events::{Event, LedgerAdjusted},
    resolution::{ResolutionPolicy, RiskSharing, ZeroSum},
    state::{EngineConfig, LedgerBuckets, LedgerDelta, Market, UserPosition},
};

/// Risk-sharing engine over the in-memory collaborators
pub type RiskSharingEngine = MarketEngine<RiskSharing, InMemoryTokenLedger, InMemoryTreasury>;

/// Zero-sum engine over the in-memory collaborators
pub type ZeroSumEngine = MarketEngine<ZeroSum, InMemoryTokenLedger, InMemoryTreasury>;

/// A market together with its ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketRecord {
    pub market: Market,
    pub ledger: LedgerBuckets,
}

/// Pre-operation copy of everything an operation may mutate
struct Snapshot {
    config: EngineConfig,
    creators: BTreeSet<Pubkey>,
    protocol_pool_total: u128,
    next_market_id: u64,
    market: Option<(u64, Option<MarketRecord>)>,
    position: Option<((Pubkey, u64), Option<UserPosition>)>,
}

pub struct MarketEngine<P, T, V> {
    config: EngineConfig,
    policy: P,
    tokens: T,
    treasury: V,
    markets: BTreeMap<u64, MarketRecord>,
    positions: BTreeMap<(Pubkey, u64), UserPosition>,
    creators: BTreeSet<Pubkey>,
    /// Protocol fee revenue across all markets, held outside any market pool
    protocol_pool_total: u128,
    next_market_id: u64,
    guard: ReentrancyGuard,
    journal: Journal,
}

impl<P, T, V> MarketEngine<P, T, V>
where
    P: ResolutionPolicy,
    T: TokenLedger,
    V: ValueTransfer,
{
    pub fn new(config: EngineConfig, policy: P, tokens: T, treasury: V) -> Result<Self, MarketError> {
        config.validate()?;
        msg!(
            "Market engine initialized: variant {:?} authority {}",
            policy.variant(),
            config.authority
        );
        Ok(Self {
            config,
            policy,
            tokens,
            treasury,
            markets: BTreeMap::new(),
            positions: BTreeMap::new(),
            creators: BTreeSet::new(),
            protocol_pool_total: 0,
            next_market_id: 1,
            guard: ReentrancyGuard::new(),
            journal: Journal::new(),
        })
    }

    /// Run `op` as one all-or-nothing unit
    ///
    /// `market_id` and `user` name the market record and position the
    /// operation may touch.
    fn execute<R, F>(&mut self, market_id: Option<u64>, user: Option<&Pubkey>, op: F) -> Result<R, MarketError>
    where
        F: FnOnce(&mut Self) -> Result<R, MarketError>,
    {
        self.guard.enter()?;
        let snapshot = self.snapshot(market_id, user);
        self.journal.clear();

        let result = op(self);

        if let Err(err) = &result {
            if err.is_fatal() {
                msg!("FATAL: {} ({:?}), operation aborted", err, err.kind());
            } else {
                msg!("Operation rejected: {}", err);
            }
            self.restore(snapshot);
            self.journal.compensate(&mut self.tokens);
        }

        self.journal.clear();
        self.guard.exit();
        result
    }

    fn snapshot(&self, market_id: Option<u64>, user: Option<&Pubkey>) -> Snapshot {
        let market = market_id.map(|id| (id, self.markets.get(&id).cloned()));
        let position = match (user, market_id) {
            (Some(user), Some(id)) => Some(((*user, id), self.positions.get(&(*user, id)).cloned())),
            _ => None,
        };
        Snapshot {
            config: self.config.clone(),
            creators: self.creators.clone(),
            protocol_pool_total: self.protocol_pool_total,
            next_market_id: self.next_market_id,
            market,
            position,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.config = snapshot.config;
        self.creators = snapshot.creators;
        self.protocol_pool_total = snapshot.protocol_pool_total;
        self.next_market_id = snapshot.next_market_id;

        if let Some((id, record)) = snapshot.market {
            match record {
                Some(record) => {
                    self.markets.insert(id, record);
                }
                None => {
                    self.markets.remove(&id);
                }
            }
        }
        if let Some((key, position)) = snapshot.position {
            match position {
                Some(position) => {
                    self.positions.insert(key, position);
                }
                None => {
                    self.positions.remove(&key);
                }
            }
        }
    }

    fn record(&self, market_id: u64) -> Result<&MarketRecord, MarketError> {
        self.markets.get(&market_id).ok_or(MarketError::MarketNotFound)
    }

    fn record_mut(&mut self, market_id: u64) -> Result<&mut MarketRecord, MarketError> {
        self.markets.get_mut(&market_id).ok_or(MarketError::MarketNotFound)
    }

    fn position_mut(&mut self, user: &Pubkey, market_id: u64) -> &mut UserPosition {
        self.positions
            .entry((*user, market_id))
            .or_insert_with(|| UserPosition::new(*user, market_id))
    }

    /// Apply a ledger delta under the configured tolerance
    fn apply_delta(&mut self, market_id: u64, delta: &LedgerDelta) -> Result<(), MarketError> {
        let tolerance = self.config.tolerance();
        let record = self.record_mut(market_id)?;
        let absorbed = record.ledger.apply(delta, &tolerance)?;
        if absorbed > 0 {
            LedgerAdjusted { market_id, absorbed }.emit();
        }
        Ok(())
    }

    fn credit_protocol_pool(&mut self, amount: u128) -> Result<(), MarketError> {
        self.protocol_pool_total = self
            .protocol_pool_total
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    fn mint(&mut self, owner: &Pubkey, id: TokenId, amount: u128) -> Result<(), MarketError> {
        if amount == 0 {
            return Ok(());
        }
        self.tokens
            .mint(owner, id, amount)
            .map_err(|err| collaborator_error("token mint", err))?;
        self.journal.record(Effect::Minted { owner: *owner, id, amount });
        Ok(())
    }

    fn burn(&mut self, owner: &Pubkey, id: TokenId, amount: u128) -> Result<(), MarketError> {
        if amount == 0 {
            return Ok(());
        }
        self.tokens
            .burn(owner, id, amount)
            .map_err(|err| collaborator_error("token burn", err))?;
        self.journal.record(Effect::Burned { owner: *owner, id, amount });
        Ok(())
    }

    /// Send value out of custody; always the last effect of an operation
    fn pay(&mut self, recipient: &Pubkey, amount: u128) -> Result<(), MarketError> {
        if amount == 0 {
            return Ok(());
        }
        self.treasury
            .transfer(recipient, amount)
            .map_err(|err| collaborator_error("value transfer", err))
    }

    fn require_authority(&self, caller: &Pubkey) -> Result<(), MarketError> {
        if *caller != self.config.authority {
            return Err(MarketError::Unauthorized);
        }
        Ok(())
    }
}

fn collaborator_error(context: &str, err: ProgramError) -> MarketError {
    msg!("Collaborator failure during {}: {:?}", context, err);
    MarketError::CollaboratorUnavailable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SHARE_UNIT;

    fn engine() -> (RiskSharingEngine, Pubkey) {
        let authority = Pubkey::new_unique();
        let engine = MarketEngine::new(
            EngineConfig::default(authority),
            RiskSharing,
            InMemoryTokenLedger::new(),
            InMemoryTreasury::new(),
        )
        .unwrap();
        (engine, authority)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = EngineConfig::default(Pubkey::new_unique());
        config.dispute_period_secs = 0;
        let result = MarketEngine::new(config, ZeroSum, InMemoryTokenLedger::new(), InMemoryTreasury::new());
        assert!(matches!(result, Err(MarketError::InvalidConfig)));
    }

    #[test]
    fn test_nested_operation_is_rejected() {
        let (mut engine, _) = engine();
        let nested = engine.execute(None, None, |engine| {
            engine.execute(None, None, |_| Ok(()))
        });
        assert_eq!(nested, Err(MarketError::ReentrantCall));
        assert!(!engine.guard.is_entered());
    }

    #[test]
    fn test_failed_operation_restores_state_and_tokens() {
        let (mut engine, _) = engine();
        let user = Pubkey::new_unique();
        let id = TokenId::outcome(9, 0);

        let result: Result<(), MarketError> = engine.execute(Some(9), Some(&user), |engine| {
            engine.protocol_pool_total = SHARE_UNIT;
            engine.position_mut(&user, 9).shares = [5, 0];
            engine.mint(&user, id, 5)?;
            Err(MarketError::CollaboratorUnavailable)
        });

        assert_eq!(result, Err(MarketError::CollaboratorUnavailable));
        assert_eq!(engine.protocol_pool_total, 0);
        assert!(engine.positions.get(&(user, 9)).is_none());
        assert_eq!(engine.tokens.balance_of(&user, id), 0);
    }
}
