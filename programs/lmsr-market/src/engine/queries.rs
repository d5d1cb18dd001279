//! Read accessors; none of these mutate

use solana_program::pubkey::Pubkey;

use super::{MarketEngine, MarketRecord};
use crate::{
    cpi::{TokenLedger, ValueTransfer},
    error::MarketError,
    math::prices,
    resolution::ResolutionPolicy,
    state::{EngineConfig, LedgerBuckets, Market, UserPosition},
};

impl<P, T, V> MarketEngine<P, T, V>
where
    P: ResolutionPolicy,
    T: TokenLedger,
    V: ValueTransfer,
{
    pub fn market(&self, market_id: u64) -> Result<&Market, MarketError> {
        Ok(&self.record(market_id)?.market)
    }

    pub fn ledger(&self, market_id: u64) -> Result<&LedgerBuckets, MarketError> {
        Ok(&self.record(market_id)?.ledger)
    }

    pub fn markets(&self) -> impl Iterator<Item = &MarketRecord> {
        self.markets.values()
    }

    pub fn position(&self, user: &Pubkey, market_id: u64) -> Option<&UserPosition> {
        self.positions.get(&(*user, market_id))
    }

    /// Current `(p0, p1)` in share units
    pub fn prices(&self, market_id: u64) -> Result<(u128, u128), MarketError> {
        let market = self.market(market_id)?;
        let [s0, s1] = market.total_shares;
        prices(s0, s1, market.liquidity_parameter)
    }

    pub fn protocol_pool_total(&self) -> u128 {
        self.protocol_pool_total
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn is_creator(&self, account: &Pubkey) -> bool {
        *account == self.config.authority || self.creators.contains(account)
    }

    pub fn next_market_id(&self) -> u64 {
        self.next_market_id
    }

    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    pub fn treasury(&self) -> &V {
        &self.treasury
    }

    /// Mutable collaborator access for the host
    pub fn treasury_mut(&mut self) -> &mut V {
        &mut self.treasury
    }
}
