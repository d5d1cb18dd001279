use solana_program::{clock::Clock, entrypoint::ProgramResult, msg, pubkey::Pubkey};

use crate::{
    cpi::{TokenLedger, ValueTransfer},
    engine::MarketEngine,
    instruction::MarketInstruction,
    resolution::ResolutionPolicy,
};

pub struct Processor;

impl Processor {
    /// Decode `instruction_data` and run it against `engine` as `caller`
    pub fn process<P, T, V>(
        engine: &mut MarketEngine<P, T, V>,
        caller: &Pubkey,
        instruction_data: &[u8],
        clock: &Clock,
    ) -> ProgramResult
    where
        P: ResolutionPolicy,
        T: TokenLedger,
        V: ValueTransfer,
    {
        let instruction = MarketInstruction::unpack(instruction_data)?;

        match instruction {
            MarketInstruction::CreateMarket { params } => {
                msg!("Instruction: CreateMarket");
                let market_id = engine.create_market(caller, params, clock)?;
                msg!("Created market {}", market_id);
            }
            MarketInstruction::AddLiquidity { market_id, payment } => {
                msg!("Instruction: AddLiquidity");
                engine.add_liquidity(caller, market_id, payment, clock)?;
            }
            MarketInstruction::RemoveLiquidity { market_id, lp_amount } => {
                msg!("Instruction: RemoveLiquidity");
                engine.remove_liquidity(caller, market_id, lp_amount, clock)?;
            }
            MarketInstruction::BuyShares {
                market_id,
                outcome,
                min_shares,
                payment,
            } => {
                msg!("Instruction: BuyShares");
                engine.buy_shares(caller, market_id, outcome, min_shares, payment, clock)?;
            }
            MarketInstruction::SellShares {
                market_id,
                outcome,
                shares,
                min_payout,
            } => {
                msg!("Instruction: SellShares");
                engine.sell_shares(caller, market_id, outcome, shares, min_payout, clock)?;
            }
            MarketInstruction::ProposeResult { market_id, outcome } => {
                msg!("Instruction: ProposeResult");
                engine.propose_result(caller, market_id, outcome, clock)?;
            }
            MarketInstruction::ProposeResultFromExternalOracle { market_id, outcome } => {
                msg!("Instruction: ProposeResultFromExternalOracle");
                engine.propose_result_from_external_oracle(caller, market_id, outcome, clock)?;
            }
            MarketInstruction::FlagManualIntervention { market_id, reason } => {
                msg!("Instruction: FlagManualIntervention");
                engine.flag_manual_intervention(caller, market_id, reason)?;
            }
            MarketInstruction::Finalize { market_id } => {
                msg!("Instruction: Finalize");
                engine.finalize(market_id, clock)?;
            }
            MarketInstruction::ClaimWinnings { market_id } => {
                msg!("Instruction: ClaimWinnings");
                engine.claim_winnings(caller, market_id)?;
            }
            MarketInstruction::SetCreator { creator, allowed } => {
                msg!("Instruction: SetCreator");
                engine.set_creator(caller, creator, allowed)?;
            }
            MarketInstruction::UpdateConfig { config } => {
                msg!("Instruction: UpdateConfig");
                engine.update_config(caller, config)?;
            }
            MarketInstruction::WithdrawProtocolFees { recipient, amount } => {
                msg!("Instruction: WithdrawProtocolFees");
                engine.withdraw_protocol_fees(caller, &recipient, amount)?;
            }
        }

        Ok(())
    }
}
