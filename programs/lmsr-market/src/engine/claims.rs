//! Winner payouts

use solana_program::{msg, pubkey::Pubkey};

use super::MarketEngine;
use crate::{
    constants::SHARE_UNIT,
    cpi::{TokenId, TokenLedger, ValueTransfer},
    error::MarketError,
    events::{Event, WinningsClaimed},
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
    /// Pay out a resolved position, once
    ///
    /// All of the caller's outcome tokens are burned, losing ones included.
    pub fn claim_winnings(&mut self, caller: &Pubkey, market_id: u64) -> Result<u128, MarketError> {
        self.execute(Some(market_id), Some(caller), |engine| {
            engine.claim_inner(caller, market_id)
        })
    }

    fn claim_inner(&mut self, caller: &Pubkey, market_id: u64) -> Result<u128, MarketError> {
        let record = self.record(market_id)?;
        if record.market.status != MarketStatus::Resolved {
            return Err(MarketError::MarketNotResolved);
        }
        let winning_outcome = record.market.winning_outcome;
        let payout_per_share = record.market.payout_per_share;
        let reserved = record.ledger.outcome_funds;

        let position = self
            .positions
            .get_mut(&(*caller, market_id))
            .ok_or(MarketError::NothingToClaim)?;
        if position.claimed {
            return Err(MarketError::AlreadyClaimed);
        }
        if position.shares.iter().all(|&s| s == 0) {
            return Err(MarketError::NothingToClaim);
        }
        let shares = position.mark_claimed()?;

        let winning_shares = shares[winning_outcome as usize];
        let payout = mul_div(winning_shares, payout_per_share, SHARE_UNIT)?;
        if payout > reserved {
            msg!(
                "Claim of {} exceeds reserved payout {} in market {}",
                payout,
                reserved,
                market_id
            );
            return Err(MarketError::ReservedFundsExhausted);
        }

        let delta = LedgerDelta {
            pool: -to_delta(payout)?,
            outcome_funds: -to_delta(payout)?,
            ..LedgerDelta::default()
        };
        self.apply_delta(market_id, &delta)?;

        let market = &mut self.record_mut(market_id)?.market;
        for (supply, burned) in market.total_shares.iter_mut().zip(shares.iter()) {
            *supply = supply.checked_sub(*burned).ok_or(MarketError::LedgerUnderflow)?;
        }
        if market.winning_shares() == 0 {
            self.release_remainder(market_id)?;
        }

        for (outcome, amount) in shares.iter().enumerate() {
            self.burn(caller, TokenId::outcome(market_id, outcome as u8), *amount)?;
        }
        self.pay(caller, payout)?;

        WinningsClaimed {
            market_id,
            user: *caller,
            winning_shares,
            payout,
        }
        .emit();
        Ok(payout)
    }

    /// Hand the floored-payout remainder of a fully claimed market to LP fees,
    /// or to the protocol pool once every LP has left
    fn release_remainder(&mut self, market_id: u64) -> Result<(), MarketError> {
        let record = self.record(market_id)?;
        let remainder = record.ledger.outcome_funds;
        if remainder == 0 {
            return Ok(());
        }
        let to_lps = record.market.lp_token_supply > 0;

        let delta = if to_lps {
            LedgerDelta {
                fees: to_delta(remainder)?,
                outcome_funds: -to_delta(remainder)?,
                ..LedgerDelta::default()
            }
        } else {
            LedgerDelta {
                pool: -to_delta(remainder)?,
                outcome_funds: -to_delta(remainder)?,
                ..LedgerDelta::default()
            }
        };
        self.apply_delta(market_id, &delta)?;
        if !to_lps {
            self.credit_protocol_pool(remainder)?;
        }

        msg!(
            "Market {} fully claimed, {} wei remainder released to {}",
            market_id,
            remainder,
            if to_lps { "LP fees" } else { "protocol pool" }
        );
        Ok(())
    }

    /// What `claim_winnings` would pay right now; zero if not claimable
    pub fn claimable(&self, user: &Pubkey, market_id: u64) -> Result<u128, MarketError> {
        let market = &self.record(market_id)?.market;
        if market.status != MarketStatus::Resolved {
            return Ok(0);
        }
        match self.positions.get(&(*user, market_id)) {
            Some(position) if !position.claimed => mul_div(
                position.shares[market.winning_outcome as usize],
                market.payout_per_share,
                SHARE_UNIT,
            ),
            _ => Ok(0),
        }
    }
}
