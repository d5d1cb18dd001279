mod common;

use common::*;
use lmsr_market::{
    error::MarketError,
    math::mul_div,
    resolution::{ResolutionPolicy, RiskSharing, ZeroSum},
};
use proptest::prelude::*;
use solana_program::pubkey::Pubkey;

#[derive(Debug, Clone)]
enum Op {
    Buy { trader: usize, outcome: u8, payment: u128 },
    Sell { trader: usize, outcome: u8, percent: u128 },
    Add { lp: usize, payment: u128 },
    Remove { lp: usize, percent: u128 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..3usize, 0..2u8, 1_000_000_000_000u128..500_000_000_000_000_000u128)
            .prop_map(|(trader, outcome, payment)| Op::Buy { trader, outcome, payment }),
        3 => (0..3usize, 0..2u8, 1..=100u128)
            .prop_map(|(trader, outcome, percent)| Op::Sell { trader, outcome, percent }),
        1 => (0..2usize, 10_000_000_000_000_000u128..1_000_000_000_000_000_000u128)
            .prop_map(|(lp, payment)| Op::Add { lp, payment }),
        1 => (0..2usize, 1..=100u128).prop_map(|(lp, percent)| Op::Remove { lp, percent }),
    ]
}

/// Executes one op, returning the value it brought into custody
fn apply_op<P: ResolutionPolicy>(
    engine: &mut TestEngine<P>,
    traders: &[Pubkey],
    lps: &[Pubkey],
    market_id: u64,
    op: &Op,
) -> Result<u128, MarketError> {
    let now = clock(500);
    match *op {
        Op::Buy { trader, outcome, payment } => engine
            .buy_shares(&traders[trader], market_id, outcome, 0, payment, &now)
            .map(|_| payment),
        Op::Sell { trader, outcome, percent } => {
            let held = engine
                .position(&traders[trader], market_id)
                .map(|p| p.shares[outcome as usize])
                .unwrap_or(0);
            engine
                .sell_shares(&traders[trader], market_id, outcome, held * percent / 100, 0, &now)
                .map(|_| 0)
        }
        Op::Add { lp, payment } => engine
            .add_liquidity(&lps[lp], market_id, payment, &now)
            .map(|_| payment),
        Op::Remove { lp, percent } => {
            let held = engine
                .position(&lps[lp], market_id)
                .map(|p| p.lp_tokens)
                .unwrap_or(0);
            engine
                .remove_liquidity(&lps[lp], market_id, held * percent / 100, &now)
                .map(|_| 0)
        }
    }
}

/// Ledger buckets fit in the pool and custody matches pool plus protocol fees
fn check_custody<P: ResolutionPolicy>(
    engine: &TestEngine<P>,
    market_id: u64,
    inflows: u128,
) -> Result<(), TestCaseError> {
    let ledger = engine.ledger(market_id).unwrap();
    prop_assert!(ledger.principal + ledger.fees + ledger.outcome_funds <= ledger.total_pool);

    let outflows = engine.treasury().total_paid_out;
    prop_assert_eq!(
        inflows - outflows,
        ledger.total_pool + engine.protocol_pool_total()
    );
    Ok(())
}

/// Runs `ops` and checks the ledger against custody after every step
fn run_sequence<P: ResolutionPolicy>(policy: P, ops: &[Op]) -> Result<(), TestCaseError> {
    let (mut engine, actors, market_id) = funded_market(policy);
    let traders = [actors.trader, Pubkey::new_unique(), Pubkey::new_unique()];
    let lps = [actors.lp, Pubkey::new_unique()];
    let mut inflows = UNIT;

    for op in ops {
        match apply_op(&mut engine, &traders, &lps, market_id, op) {
            Ok(received) => inflows += received,
            Err(err) => {
                prop_assert!(!err.is_fatal(), "fatal error {:?} on {:?}", err, op);
            }
        }
        check_custody(&engine, market_id, inflows)?;
    }
    Ok(())
}

/// Trades `ops`, resolves to `winner`, then pays every trader and LP out
fn run_to_settlement<P: ResolutionPolicy>(
    policy: P,
    ops: &[Op],
    winner: u8,
) -> Result<(), TestCaseError> {
    let (mut engine, actors, market_id) = funded_market(policy);
    let traders = [actors.trader, Pubkey::new_unique(), Pubkey::new_unique()];
    let lps = [actors.lp, Pubkey::new_unique()];
    let mut inflows = UNIT;

    for op in ops {
        match apply_op(&mut engine, &traders, &lps, market_id, op) {
            Ok(received) => inflows += received,
            Err(err) => {
                prop_assert!(!err.is_fatal(), "fatal error {:?} on {:?}", err, op);
            }
        }
    }

    let payout_per_share = resolve(&mut engine, &actors, market_id, winner);
    let winning_shares = engine.market(market_id).unwrap().winning_shares();
    let owed = mul_div(winning_shares, payout_per_share, UNIT).unwrap();
    let ledger = engine.ledger(market_id).unwrap();
    prop_assert!(owed <= ledger.outcome_funds, "owed {} reserved {}", owed, ledger.outcome_funds);
    prop_assert!(owed <= ledger.total_pool);
    check_custody(&engine, market_id, inflows)?;

    for trader in &traders {
        if let Err(err) = engine.claim_winnings(trader, market_id) {
            prop_assert_eq!(err, MarketError::NothingToClaim);
        }
        check_custody(&engine, market_id, inflows)?;
    }
    prop_assert_eq!(engine.ledger(market_id).unwrap().outcome_funds, 0);

    let after = clock(CLOSING_TIME + DISPUTE + 10);
    for lp in &lps {
        let held = engine.position(lp, market_id).map(|p| p.lp_tokens).unwrap_or(0);
        if held > 0 {
            engine.remove_liquidity(lp, market_id, held, &after).unwrap();
        }
        check_custody(&engine, market_id, inflows)?;
    }

    prop_assert_eq!(engine.market(market_id).unwrap().lp_token_supply, 0);
    prop_assert_eq!(engine.ledger(market_id).unwrap().total_pool, 0);
    prop_assert_eq!(
        inflows - engine.treasury().total_paid_out,
        engine.protocol_pool_total()
    );
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_risk_sharing_conserves_value(ops in prop::collection::vec(op_strategy(), 1..20)) {
        run_sequence(RiskSharing, &ops)?;
    }

    #[test]
    fn prop_zero_sum_conserves_value(ops in prop::collection::vec(op_strategy(), 1..20)) {
        run_sequence(ZeroSum, &ops)?;
    }

    #[test]
    fn prop_risk_sharing_settles_completely(
        ops in prop::collection::vec(op_strategy(), 1..20),
        winner in 0..2u8,
    ) {
        run_to_settlement(RiskSharing, &ops, winner)?;
    }

    #[test]
    fn prop_zero_sum_settles_completely(
        ops in prop::collection::vec(op_strategy(), 1..20),
        winner in 0..2u8,
    ) {
        run_to_settlement(ZeroSum, &ops, winner)?;
    }
}
