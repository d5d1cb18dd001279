//! Authority-only operations

use solana_program::{msg, pubkey::Pubkey};

use super::MarketEngine;
use crate::{
    cpi::{TokenLedger, ValueTransfer},
    error::MarketError,
    events::{ConfigUpdated, CreatorUpdated, Event, ProtocolFeesWithdrawn},
    resolution::ResolutionPolicy,
    state::EngineConfig,
};

impl<P, T, V> MarketEngine<P, T, V>
where
    P: ResolutionPolicy,
    T: TokenLedger,
    V: ValueTransfer,
{
    pub fn set_creator(&mut self, caller: &Pubkey, creator: Pubkey, allowed: bool) -> Result<(), MarketError> {
        self.execute(None, None, |engine| {
            engine.require_authority(caller)?;
            if allowed {
                engine.creators.insert(creator);
            } else {
                engine.creators.remove(&creator);
            }
            msg!("Creator {} allowed: {}", creator, allowed);
            CreatorUpdated { creator, allowed }.emit();
            Ok(())
        })
    }

    /// Replace the engine config; the new authority takes effect immediately
    pub fn update_config(&mut self, caller: &Pubkey, config: EngineConfig) -> Result<(), MarketError> {
        self.execute(None, None, |engine| {
            engine.require_authority(caller)?;
            config.validate()?;

            ConfigUpdated {
                authority: config.authority,
                protocol_fee_bps: config.protocol_fee_bps,
                lp_fee_bps: config.lp_fee_bps,
            }
            .emit();
            engine.config = config;
            Ok(())
        })
    }

    pub fn withdraw_protocol_fees(
        &mut self,
        caller: &Pubkey,
        recipient: &Pubkey,
        amount: u128,
    ) -> Result<(), MarketError> {
        self.execute(None, None, |engine| {
            engine.require_authority(caller)?;
            if amount == 0 {
                return Err(MarketError::ZeroAmount);
            }
            if amount > engine.protocol_pool_total {
                return Err(MarketError::InsufficientProtocolFees);
            }

            engine.protocol_pool_total -= amount;
            engine.pay(recipient, amount)?;

            ProtocolFeesWithdrawn {
                recipient: *recipient,
                amount,
                remaining: engine.protocol_pool_total,
            }
            .emit();
            Ok(())
        })
    }
}
