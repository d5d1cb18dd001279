//! Market creation and resolution

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::Clock, msg, pubkey::Pubkey};

use super::{MarketEngine, MarketRecord};
use crate::{
    cpi::{TokenLedger, ValueTransfer},
    error::MarketError,
    events::{Event, FundsSeparated, ManualInterventionFlagged, MarketCreated, MarketFinalized, OutcomeProposed},
    resolution::ResolutionPolicy,
    state::{LedgerBuckets, Market, MarketStatus},
};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateMarketParams {
    pub title: String,
    pub closing_time: i64,
    pub liquidity_parameter: u128,
    pub lp_lockdown_secs: i64,
    /// `Pubkey::default()` disables the manual oracle
    pub manual_oracle: Pubkey,
    /// `Pubkey::default()` disables the settlement adapter
    pub settlement_adapter: Pubkey,
}

/// Which authorized source is proposing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProposalSource {
    ManualOracle,
    SettlementAdapter,
}

impl<P, T, V> MarketEngine<P, T, V>
where
    P: ResolutionPolicy,
    T: TokenLedger,
    V: ValueTransfer,
{
    /// Create a market in `Created` status; returns its id
    pub fn create_market(
        &mut self,
        caller: &Pubkey,
        params: CreateMarketParams,
        clock: &Clock,
    ) -> Result<u64, MarketError> {
        let market_id = self.next_market_id;
        self.execute(Some(market_id), None, |engine| {
            engine.create_market_inner(caller, params, clock.unix_timestamp)
        })
    }

    fn create_market_inner(
        &mut self,
        caller: &Pubkey,
        params: CreateMarketParams,
        now: i64,
    ) -> Result<u64, MarketError> {
        if *caller != self.config.authority && !self.creators.contains(caller) {
            return Err(MarketError::UnauthorizedCreator);
        }

        if params.title.is_empty() || params.title.len() > self.config.max_title_len as usize {
            msg!("Title length {} out of range", params.title.len());
            return Err(MarketError::InvalidMarketParameters);
        }
        if params.liquidity_parameter < self.config.min_liquidity_parameter
            || params.liquidity_parameter > self.config.max_liquidity_parameter
        {
            return Err(MarketError::InvalidLiquidityParameter);
        }
        if params.closing_time <= now {
            return Err(MarketError::InvalidMarketParameters);
        }
        let trading_window = params.closing_time - now;
        if params.lp_lockdown_secs < 0 || params.lp_lockdown_secs >= trading_window {
            return Err(MarketError::InvalidMarketParameters);
        }
        if params.manual_oracle == Pubkey::default() && params.settlement_adapter == Pubkey::default() {
            return Err(MarketError::InvalidMarketParameters);
        }

        let market_id = self.next_market_id;
        self.next_market_id = market_id.checked_add(1).ok_or(MarketError::ArithmeticOverflow)?;

        let market = Market::new(
            market_id,
            params.title,
            *caller,
            now,
            params.closing_time,
            params.liquidity_parameter,
            params.lp_lockdown_secs,
            params.manual_oracle,
            params.settlement_adapter,
        );

        msg!("Market {} created by {}", market_id, caller);
        MarketCreated {
            market_id,
            creator: *caller,
            title: market.title.clone(),
            closing_time: market.closing_time,
            liquidity_parameter: market.liquidity_parameter,
            variant: self.policy.variant(),
        }
        .emit();

        self.markets.insert(
            market_id,
            MarketRecord {
                market,
                ledger: LedgerBuckets::default(),
            },
        );
        Ok(market_id)
    }

    /// Outcome proposal by the market's manual oracle
    pub fn propose_result(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        outcome: u8,
        clock: &Clock,
    ) -> Result<(), MarketError> {
        self.execute(Some(market_id), None, |engine| {
            engine.propose(caller, market_id, outcome, ProposalSource::ManualOracle, clock.unix_timestamp)
        })
    }

    /// Outcome proposal by the market's settlement adapter
    pub fn propose_result_from_external_oracle(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        outcome: u8,
        clock: &Clock,
    ) -> Result<(), MarketError> {
        self.execute(Some(market_id), None, |engine| {
            engine.propose(
                caller,
                market_id,
                outcome,
                ProposalSource::SettlementAdapter,
                clock.unix_timestamp,
            )
        })
    }

    fn propose(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        outcome: u8,
        source: ProposalSource,
        now: i64,
    ) -> Result<(), MarketError> {
        let market = &mut self.record_mut(market_id)?.market;

        let authorized = match source {
            ProposalSource::ManualOracle => market.manual_oracle,
            ProposalSource::SettlementAdapter => market.settlement_adapter,
        };
        if authorized == Pubkey::default() || *caller != authorized {
            return Err(MarketError::UnauthorizedOracle);
        }

        if market.outcome_set {
            return Err(MarketError::AlreadyProposed);
        }
        if market.status != MarketStatus::Active {
            return Err(MarketError::MarketNotActive);
        }
        if source == ProposalSource::SettlementAdapter && market.requires_manual_intervention {
            msg!("Market {} awaits manual resolution", market_id);
            return Err(MarketError::ManualInterventionRequired);
        }
        if now <= market.closing_time {
            return Err(MarketError::ProposalTooEarly);
        }

        market.set_outcome(outcome, now)?;

        OutcomeProposed {
            market_id,
            proposer: *caller,
            outcome,
            via_settlement_adapter: source == ProposalSource::SettlementAdapter,
            timestamp: now,
        }
        .emit();
        Ok(())
    }

    /// Record that the external data source for a market failed
    ///
    /// Afterwards only the manual oracle can propose.
    pub fn flag_manual_intervention(
        &mut self,
        caller: &Pubkey,
        market_id: u64,
        reason: String,
    ) -> Result<(), MarketError> {
        self.execute(Some(market_id), None, |engine| {
            let market = &mut engine.record_mut(market_id)?.market;

            let is_reporter = (*caller == market.settlement_adapter || *caller == market.manual_oracle)
                && *caller != Pubkey::default();
            if !is_reporter {
                return Err(MarketError::UnauthorizedOracle);
            }
            if market.outcome_set {
                return Err(MarketError::AlreadyProposed);
            }
            if market.requires_manual_intervention {
                return Ok(());
            }

            market.requires_manual_intervention = true;
            msg!("Market {} flagged for manual intervention", market_id);
            ManualInterventionFlagged {
                market_id,
                reporter: *caller,
                reason,
            }
            .emit();
            Ok(())
        })
    }

    /// Resolve a closed market once the dispute period has elapsed
    ///
    /// Anyone may call this. Returns the payout per winning share.
    pub fn finalize(&mut self, market_id: u64, clock: &Clock) -> Result<u128, MarketError> {
        self.execute(Some(market_id), None, |engine| {
            engine.finalize_inner(market_id, clock.unix_timestamp)
        })
    }

    fn finalize_inner(&mut self, market_id: u64, now: i64) -> Result<u128, MarketError> {
        let tolerance = self.config.tolerance();
        let dispute_period = self.config.dispute_period_secs;
        let record = self.markets.get_mut(&market_id).ok_or(MarketError::MarketNotFound)?;
        let MarketRecord { market, ledger } = record;

        match market.status {
            MarketStatus::Closed => {}
            MarketStatus::Resolved => return Err(MarketError::AlreadyFinalized),
            _ => return Err(MarketError::MarketNotClosed),
        }
        if now < market.proposal_timestamp.saturating_add(dispute_period) {
            return Err(MarketError::DisputePeriodActive);
        }

        let winning_shares = market.winning_shares();
        market.payout_per_share = self.policy.payout_per_share(ledger, winning_shares)?;
        market.transition_to(MarketStatus::Resolved)?;

        let separation = self.policy.settle(market, ledger)?;
        ledger.check_invariant(&tolerance)?;

        MarketFinalized {
            market_id,
            winning_outcome: market.winning_outcome,
            winning_shares,
            payout_per_share: market.payout_per_share,
        }
        .emit();
        if let Some(separation) = separation {
            FundsSeparated {
                market_id,
                reserved_for_winners: separation.reserved_for_winners,
                lp_bucket: separation.lp_bucket,
            }
            .emit();
        }

        Ok(market.payout_per_share)
    }
}
