mod common;

use common::*;
use lmsr_market::{
    error::MarketError,
    instruction::MarketInstruction,
    resolution::RiskSharing,
    state::MarketStatus,
    Processor,
};
use solana_program::program_error::ProgramError;

#[test]
fn test_dispatches_full_market_flow() {
    let (mut engine, actors, _) = funded_market(RiskSharing);

    let create = MarketInstruction::CreateMarket {
        params: actors.market_params(),
    };
    Processor::process(&mut engine, &actors.authority, &create.pack().unwrap(), &clock(0)).unwrap();
    let market_id = 2;
    assert_eq!(engine.market(market_id).unwrap().status, MarketStatus::Created);

    let add = MarketInstruction::AddLiquidity {
        market_id,
        payment: UNIT,
    };
    Processor::process(&mut engine, &actors.lp, &add.pack().unwrap(), &clock(1)).unwrap();
    assert_eq!(engine.market(market_id).unwrap().status, MarketStatus::Active);

    let buy = MarketInstruction::BuyShares {
        market_id,
        outcome: 1,
        min_shares: 1,
        payment: B,
    };
    Processor::process(&mut engine, &actors.trader, &buy.pack().unwrap(), &clock(2)).unwrap();
    let shares = engine.position(&actors.trader, market_id).unwrap().shares[1];
    assert!(shares > 0);

    let propose = MarketInstruction::ProposeResult {
        market_id,
        outcome: 1,
    };
    Processor::process(
        &mut engine,
        &actors.oracle,
        &propose.pack().unwrap(),
        &clock(CLOSING_TIME + 1),
    )
    .unwrap();

    let finalize = MarketInstruction::Finalize { market_id };
    Processor::process(
        &mut engine,
        &actors.trader,
        &finalize.pack().unwrap(),
        &clock(CLOSING_TIME + 1 + DISPUTE),
    )
    .unwrap();

    let claim = MarketInstruction::ClaimWinnings { market_id };
    let data = claim.pack().unwrap();
    let later = clock(CLOSING_TIME + 2 + DISPUTE);
    Processor::process(&mut engine, &actors.trader, &data, &later).unwrap();
    assert_eq!(
        Processor::process(&mut engine, &actors.trader, &data, &later),
        Err(ProgramError::from(MarketError::AlreadyClaimed))
    );
}

#[test]
fn test_maps_errors_to_program_errors() {
    let (mut engine, actors, market_id) = funded_market(RiskSharing);

    assert_eq!(
        Processor::process(&mut engine, &actors.trader, &[255, 0, 1], &clock(0)),
        Err(ProgramError::Custom(MarketError::InvalidInstruction as u32))
    );

    let withdraw = MarketInstruction::WithdrawProtocolFees {
        recipient: actors.trader,
        amount: 1,
    };
    let err = Processor::process(&mut engine, &actors.trader, &withdraw.pack().unwrap(), &clock(0))
        .unwrap_err();
    assert_eq!(MarketError::try_from(err).unwrap(), MarketError::Unauthorized);

    let sell = MarketInstruction::SellShares {
        market_id,
        outcome: 0,
        shares: UNIT,
        min_payout: 0,
    };
    assert_eq!(
        Processor::process(&mut engine, &actors.trader, &sell.pack().unwrap(), &clock(5)),
        Err(ProgramError::Custom(6060))
    );
}
