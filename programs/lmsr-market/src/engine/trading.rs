//! Buying and selling outcome shares
//!
//! Buys are budget-first: the fee rate is taken off the payment before the
//! pricing core is asked how many shares fit, so the executed cost is the
//! quoted cost.

use solana_program::{clock::Clock, msg, pubkey::Pubkey};

use super::MarketEngine;
use crate::{
    constants::{BPS_DENOMINATOR, OUTCOME_COUNT},
    cpi::{TokenId, TokenLedger, ValueTransfer},
    error::MarketError,
    events::{Event, SharesBought, SharesSold},
    math::{apply_bps, buy_within_budget, mul_div, sell_value},
    resolution::{ResolutionPolicy, SellFlow},
    state::{Market, MarketStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyReceipt {
    pub shares: u128,
    pub cost: u128,
    pub protocol_fee: u128,
    pub lp_fee: u128,
    pub refund: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellReceipt {
    /// C(before) - C(after)
    pub base_value: u128,
    pub protocol_fee: u128,
    pub lp_fee: u128,
    /// Paid to the seller
    pub payout: u128,
}

fn require_trading_open(market: &Market, now: i64) -> Result<(), MarketError> {
    if market.status != MarketStatus::Active {
        return Err(MarketError::MarketNotActive);
    }
    if !market.is_trading_open(now) {
        return Err(MarketError::TradingClosed);
    }
    Ok(())
}

impl<P, T, V> MarketEngine<P, T, V>
where
    P: ResolutionPolicy,
    T: TokenLedger,
    V: ValueTransfer,
{
    /// Spend up to `payment` on shares of `outcome`
    pub fn buy_shares(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        outcome: u8,
        min_shares: u128,
        payment: u128,
        clock: &Clock,
    ) -> Result<BuyReceipt, MarketError> {
        self.execute(Some(market_id), Some(caller), |engine| {
            engine.buy_inner(caller, market_id, outcome, min_shares, payment, clock.unix_timestamp)
        })
    }

    fn buy_inner(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        outcome: u8,
        min_shares: u128,
        payment: u128,
        now: i64,
    ) -> Result<BuyReceipt, MarketError> {
        if outcome as usize >= OUTCOME_COUNT {
            return Err(MarketError::InvalidOutcome);
        }
        if payment < self.config.min_trade_wei {
            return Err(MarketError::TradeTooSmall);
        }
        if payment > self.config.max_trade_wei {
            return Err(MarketError::TradeTooLarge);
        }

        let protocol_bps = self.config.protocol_fee_bps;
        let lp_bps = self.config.lp_fee_bps;
        let total_bps = self.config.total_fee_bps() as u128;

        let record = self.record(market_id)?;
        require_trading_open(&record.market, now)?;

        let budget = mul_div(payment, BPS_DENOMINATOR - total_bps, BPS_DENOMINATOR)?;
        let [s0, s1] = record.market.total_shares;
        let quote = buy_within_budget(
            s0,
            s1,
            outcome,
            record.market.liquidity_parameter,
            budget,
            record.ledger.total_pool,
        )?;

        if quote.shares == 0 {
            return Err(MarketError::TradeTooSmall);
        }
        if quote.shares < min_shares {
            msg!("Slippage: {} shares quoted, {} required", quote.shares, min_shares);
            return Err(MarketError::SlippageExceeded);
        }

        let protocol_fee = apply_bps(quote.cost, protocol_bps)?;
        let lp_fee = apply_bps(quote.cost, lp_bps)?;
        let charged = quote
            .cost
            .checked_add(protocol_fee)
            .and_then(|v| v.checked_add(lp_fee))
            .ok_or(MarketError::ArithmeticOverflow)?;
        let refund = payment
            .checked_sub(charged)
            .ok_or(MarketError::InsufficientPayment)?;

        let delta = self.policy.buy_delta(&record.ledger, quote.cost, lp_fee)?;
        self.apply_delta(market_id, &delta)?;
        self.credit_protocol_pool(protocol_fee)?;

        let market = &mut self.record_mut(market_id)?.market;
        let slot = &mut market.total_shares[outcome as usize];
        *slot = slot.checked_add(quote.shares).ok_or(MarketError::ArithmeticOverflow)?;
        market.total_volume = market.total_volume.saturating_add(quote.cost);
        market.total_fees = market.total_fees.saturating_add(protocol_fee + lp_fee);

        let position = self.position_mut(caller, market_id);
        position.credit_shares(outcome, quote.shares)?;
        position.amount_spent = position.amount_spent.saturating_add(charged);

        self.mint(caller, TokenId::outcome(market_id, outcome), quote.shares)?;
        self.pay(caller, refund)?;

        SharesBought {
            market_id,
            buyer: *caller,
            outcome,
            shares: quote.shares,
            cost: quote.cost,
            protocol_fee,
            lp_fee,
            refund,
        }
        .emit();

        Ok(BuyReceipt {
            shares: quote.shares,
            cost: quote.cost,
            protocol_fee,
            lp_fee,
            refund,
        })
    }

    /// Redeem `shares` of `outcome` back to the market maker
    pub fn sell_shares(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        outcome: u8,
        shares: u128,
        min_payout: u128,
        clock: &Clock,
    ) -> Result<SellReceipt, MarketError> {
        self.execute(Some(market_id), Some(caller), |engine| {
            engine.sell_inner(caller, market_id, outcome, shares, min_payout, clock.unix_timestamp)
        })
    }

    fn sell_inner(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        outcome: u8,
        shares: u128,
        min_payout: u128,
        now: i64,
    ) -> Result<SellReceipt, MarketError> {
        if outcome as usize >= OUTCOME_COUNT {
            return Err(MarketError::InvalidOutcome);
        }
        if shares == 0 {
            return Err(MarketError::ZeroAmount);
        }
        if shares < self.config.min_trade_wei {
            return Err(MarketError::TradeTooSmall);
        }

        let record = self.record(market_id)?;
        require_trading_open(&record.market, now)?;

        let held = self
            .positions
            .get(&(*caller, market_id))
            .map(|p| p.shares[outcome as usize])
            .unwrap_or(0);
        if held < shares {
            return Err(MarketError::InsufficientShares);
        }

        let [s0, s1] = record.market.total_shares;
        let base_value = sell_value(s0, s1, outcome, record.market.liquidity_parameter, shares)?;
        let protocol_fee = apply_bps(base_value, self.config.protocol_fee_bps)?;
        let lp_fee = apply_bps(base_value, self.config.lp_fee_bps)?;
        let payout = base_value
            .checked_sub(protocol_fee + lp_fee)
            .ok_or(MarketError::ArithmeticOverflow)?;

        if payout == 0 {
            return Err(MarketError::TradeTooSmall);
        }
        if payout < min_payout {
            msg!("Slippage: payout {} below floor {}", payout, min_payout);
            return Err(MarketError::SlippageExceeded);
        }

        let flow = SellFlow {
            base_value,
            outflow: payout + protocol_fee,
            lp_fee,
        };
        let delta = self.policy.sell_delta(&record.ledger, &flow)?;
        self.apply_delta(market_id, &delta)?;
        self.credit_protocol_pool(protocol_fee)?;

        let market = &mut self.record_mut(market_id)?.market;
        market.total_shares[outcome as usize] -= shares;
        market.total_volume = market.total_volume.saturating_add(base_value);
        market.total_fees = market.total_fees.saturating_add(protocol_fee + lp_fee);

        self.position_mut(caller, market_id).debit_shares(outcome, shares)?;

        self.burn(caller, TokenId::outcome(market_id, outcome), shares)?;
        self.pay(caller, payout)?;

        SharesSold {
            market_id,
            seller: *caller,
            outcome,
            shares,
            payout,
            protocol_fee,
            lp_fee,
        }
        .emit();

        Ok(SellReceipt {
            base_value,
            protocol_fee,
            lp_fee,
            payout,
        })
    }
}
