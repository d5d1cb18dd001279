//! LP deposits and withdrawals

use solana_program::{clock::Clock, msg, pubkey::Pubkey};

use super::MarketEngine;
use crate::{
    cpi::{TokenId, TokenLedger, ValueTransfer},
    error::MarketError,
    events::{Event, LiquidityAdded, LiquidityRemoved},
    math::mul_div,
    resolution::ResolutionPolicy,
    state::{to_delta, LedgerDelta, MarketStatus},
};

impl<P, T, V> MarketEngine<P, T, V>
where
    P: ResolutionPolicy,
    T: TokenLedger,
    V: ValueTransfer,
{
    /// Deposit `payment` as LP principal; returns LP tokens minted
    ///
    /// The first deposit must meet the initial minimum and activates the
    /// market. Later deposits mint in proportion to supply over principal.
    pub fn add_liquidity(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        payment: u128,
        clock: &Clock,
    ) -> Result<u128, MarketError> {
        self.execute(Some(market_id), Some(caller), |engine| {
            engine.add_liquidity_inner(caller, market_id, payment, clock.unix_timestamp)
        })
    }

    fn add_liquidity_inner(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        payment: u128,
        now: i64,
    ) -> Result<u128, MarketError> {
        if payment == 0 {
            return Err(MarketError::ZeroAmount);
        }
        let min_initial = self.config.min_initial_liquidity_wei;
        let record = self.record(market_id)?;
        let market = &record.market;

        match market.status {
            MarketStatus::Created => {
                if payment < min_initial {
                    return Err(MarketError::LiquidityBelowMinimum);
                }
            }
            MarketStatus::Active => {}
            _ => return Err(MarketError::MarketNotActive),
        }
        if now >= market.closing_time {
            return Err(MarketError::TradingClosed);
        }

        let supply = market.lp_token_supply;
        let principal = record.ledger.principal;
        let minted = if supply == 0 || principal == 0 {
            payment
        } else {
            mul_div(payment, supply, principal)?
        };
        if minted == 0 {
            return Err(MarketError::TradeTooSmall);
        }

        let delta = LedgerDelta {
            pool: to_delta(payment)?,
            principal: to_delta(payment)?,
            ..LedgerDelta::default()
        };
        self.apply_delta(market_id, &delta)?;

        let market = &mut self.record_mut(market_id)?.market;
        if market.status == MarketStatus::Created {
            market.transition_to(MarketStatus::Active)?;
        }
        market.lp_token_supply = market
            .lp_token_supply
            .checked_add(minted)
            .ok_or(MarketError::ArithmeticOverflow)?;

        let position = self.position_mut(caller, market_id);
        position.lp_tokens = position
            .lp_tokens
            .checked_add(minted)
            .ok_or(MarketError::ArithmeticOverflow)?;

        self.mint(caller, TokenId::liquidity(market_id), minted)?;

        msg!("Liquidity added to market {}: {} wei, {} LP tokens", market_id, payment, minted);
        LiquidityAdded {
            market_id,
            provider: *caller,
            amount: payment,
            lp_tokens_minted: minted,
        }
        .emit();
        Ok(minted)
    }

    /// Burn `lp_amount` LP tokens for principal and, where earned, fees
    ///
    /// While the market is Active, a partial holder forfeits the fee share
    /// to the remaining LPs and principal may not drop below the reserve
    /// floor. After resolution the share of both buckets is paid and the
    /// last LP out takes whatever remains.
    pub fn remove_liquidity(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        lp_amount: u128,
        clock: &Clock,
    ) -> Result<u128, MarketError> {
        self.execute(Some(market_id), Some(caller), |engine| {
            engine.remove_liquidity_inner(caller, market_id, lp_amount, clock.unix_timestamp)
        })
    }

    fn remove_liquidity_inner(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        lp_amount: u128,
        now: i64,
    ) -> Result<u128, MarketError> {
        if lp_amount == 0 {
            return Err(MarketError::ZeroAmount);
        }
        let reserve_floor = self.config.min_principal_reserve_wei;
        let record = self.record(market_id)?;
        let market = &record.market;
        let ledger = &record.ledger;

        let trading_possible = match market.status {
            MarketStatus::Created => return Err(MarketError::MarketNotActive),
            MarketStatus::Active => {
                if market.in_lockdown(now) {
                    return Err(MarketError::LiquidityLocked);
                }
                true
            }
            MarketStatus::Closed => return Err(MarketError::LiquidityLocked),
            MarketStatus::Resolved => {
                if !self.policy.lp_exit_ready(market) {
                    return Err(MarketError::FundsNotSeparated);
                }
                false
            }
        };

        let held = self
            .positions
            .get(&(*caller, market_id))
            .map(|p| p.lp_tokens)
            .unwrap_or(0);
        if held < lp_amount {
            return Err(MarketError::InsufficientLpTokens);
        }

        let supply = market.lp_token_supply;
        let full_exit = lp_amount == supply;

        let principal_share = if full_exit {
            ledger.principal
        } else {
            mul_div(ledger.principal, lp_amount, supply)?
        };

        let fees_forfeited = trading_possible && held < supply;
        let fee_share = if fees_forfeited {
            0
        } else if full_exit {
            ledger.fees
        } else {
            mul_div(ledger.fees, lp_amount, supply)?
        };

        if trading_possible && ledger.principal - principal_share < reserve_floor {
            msg!(
                "Withdrawal would leave principal {} under reserve {}",
                ledger.principal - principal_share,
                reserve_floor
            );
            return Err(MarketError::ReserveFloorBreached);
        }

        let paid = principal_share
            .checked_add(fee_share)
            .ok_or(MarketError::ArithmeticOverflow)?;
        if paid > ledger.total_pool {
            return Err(MarketError::InsufficientPoolBalance);
        }

        let delta = LedgerDelta {
            pool: -to_delta(paid)?,
            principal: -to_delta(principal_share)?,
            fees: -to_delta(fee_share)?,
            outcome_funds: 0,
        };
        self.apply_delta(market_id, &delta)?;

        let market = &mut self.record_mut(market_id)?.market;
        market.lp_token_supply -= lp_amount;
        self.position_mut(caller, market_id).lp_tokens -= lp_amount;

        self.burn(caller, TokenId::liquidity(market_id), lp_amount)?;
        self.pay(caller, paid)?;

        msg!(
            "Liquidity removed from market {}: {} LP tokens, principal {} fees {}",
            market_id,
            lp_amount,
            principal_share,
            fee_share
        );
        LiquidityRemoved {
            market_id,
            provider: *caller,
            lp_tokens_burned: lp_amount,
            principal_paid: principal_share,
            fees_paid: fee_share,
            fees_forfeited,
        }
        .emit();
        Ok(paid)
    }
}
