#![allow(dead_code)]

use lmsr_market::{
    cpi::{InMemoryTokenLedger, TokenLedger, ValueTransfer},
    engine::{CreateMarketParams, MarketEngine},
    resolution::ResolutionPolicy,
    state::EngineConfig,
};
use solana_program::{clock::Clock, entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};
use std::collections::HashMap;

pub const UNIT: u128 = 1_000_000_000_000_000_000;
pub const B: u128 = UNIT / 10;
pub const CLOSING_TIME: i64 = 10_000;
pub const LOCKDOWN: i64 = 1_000;
pub const DISPUTE: i64 = 86_400;

pub fn clock(unix_timestamp: i64) -> Clock {
    Clock {
        unix_timestamp,
        ..Clock::default()
    }
}

/// Treasury whose transfers can be made to fail
#[derive(Debug, Default)]
pub struct FlakyTreasury {
    pub failing: bool,
    pub received: HashMap<Pubkey, u128>,
    pub total_paid_out: u128,
}

impl ValueTransfer for FlakyTreasury {
    fn transfer(&mut self, recipient: &Pubkey, amount: u128) -> ProgramResult {
        if self.failing {
            return Err(ProgramError::Custom(1));
        }
        *self.received.entry(*recipient).or_insert(0) += amount;
        self.total_paid_out += amount;
        Ok(())
    }
}

impl FlakyTreasury {
    pub fn received(&self, recipient: &Pubkey) -> u128 {
        self.received.get(recipient).copied().unwrap_or(0)
    }
}

pub struct Actors {
    pub authority: Pubkey,
    pub oracle: Pubkey,
    pub adapter: Pubkey,
    pub lp: Pubkey,
    pub trader: Pubkey,
}

impl Actors {
    pub fn new() -> Self {
        Self {
            authority: Pubkey::new_unique(),
            oracle: Pubkey::new_unique(),
            adapter: Pubkey::new_unique(),
            lp: Pubkey::new_unique(),
            trader: Pubkey::new_unique(),
        }
    }

    pub fn market_params(&self) -> CreateMarketParams {
        CreateMarketParams {
            title: "Will it rain in Lisbon tomorrow?".to_string(),
            closing_time: CLOSING_TIME,
            liquidity_parameter: B,
            lp_lockdown_secs: LOCKDOWN,
            manual_oracle: self.oracle,
            settlement_adapter: self.adapter,
        }
    }
}

pub type TestEngine<P> = MarketEngine<P, InMemoryTokenLedger, FlakyTreasury>;

/// Engine with one market funded by `actors.lp` with one unit
pub fn funded_market<P: ResolutionPolicy>(policy: P) -> (TestEngine<P>, Actors, u64) {
    let actors = Actors::new();
    let mut engine = MarketEngine::new(
        EngineConfig::default(actors.authority),
        policy,
        InMemoryTokenLedger::new(),
        FlakyTreasury::default(),
    )
    .unwrap();
    let market_id = engine
        .create_market(&actors.authority, actors.market_params(), &clock(0))
        .unwrap();
    engine
        .add_liquidity(&actors.lp, market_id, UNIT, &clock(1))
        .unwrap();
    (engine, actors, market_id)
}

/// Move a market through proposal and dispute period to Resolved
pub fn resolve<P, T, V>(engine: &mut MarketEngine<P, T, V>, actors: &Actors, market_id: u64, outcome: u8) -> u128
where
    P: ResolutionPolicy,
    T: TokenLedger,
    V: ValueTransfer,
{
    engine
        .propose_result(&actors.oracle, market_id, outcome, &clock(CLOSING_TIME + 1))
        .unwrap();
    engine
        .finalize(market_id, &clock(CLOSING_TIME + 1 + DISPUTE))
        .unwrap()
}
