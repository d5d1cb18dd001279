//! Event logging
//!
//! Events are borsh-serialized and written to the program log as bs58.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::resolution::ResolutionVariant;

/// Event type discriminator
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    // Lifecycle
    MarketCreated = 1,
    OutcomeProposed = 2,
    MarketFinalized = 3,
    FundsSeparated = 4,
    ManualInterventionFlagged = 5,

    // Liquidity
    LiquidityAdded = 10,
    LiquidityRemoved = 11,

    // Trading
    SharesBought = 20,
    SharesSold = 21,

    // Claims and ledger
    WinningsClaimed = 30,
    LedgerAdjusted = 31,
    ProtocolFeesWithdrawn = 32,

    // Admin
    ConfigUpdated = 40,
    CreatorUpdated = 41,
}

pub trait Event: BorshSerialize {
    fn event_type() -> EventType;

    fn emit(&self) {
        msg!("LMSR_MARKET_EVENT");
        msg!("TYPE:{:?}", Self::event_type());

        if let Ok(data) = self.try_to_vec() {
            msg!("DATA:{}", bs58::encode(&data).into_string());
        }
    }
}

#[macro_export]
macro_rules! define_event {
    ($name:ident { $($field:ident: $type:ty),* $(,)? }) => {
        #[derive(::borsh::BorshSerialize, ::borsh::BorshDeserialize, Debug, Clone, PartialEq)]
        pub struct $name {
            $(pub $field: $type,)*
        }

        impl $crate::events::Event for $name {
            fn event_type() -> $crate::events::EventType {
                $crate::events::EventType::$name
            }
        }
    };
}

define_event!(MarketCreated {
    market_id: u64,
    creator: Pubkey,
    title: String,
    closing_time: i64,
    liquidity_parameter: u128,
    variant: ResolutionVariant,
});

define_event!(OutcomeProposed {
    market_id: u64,
    proposer: Pubkey,
    outcome: u8,
    via_settlement_adapter: bool,
    timestamp: i64,
});

define_event!(MarketFinalized {
    market_id: u64,
    winning_outcome: u8,
    winning_shares: u128,
    payout_per_share: u128,
});

define_event!(FundsSeparated {
    market_id: u64,
    reserved_for_winners: u128,
    lp_bucket: u128,
});

define_event!(ManualInterventionFlagged {
    market_id: u64,
    reporter: Pubkey,
    reason: String,
});

define_event!(LiquidityAdded {
    market_id: u64,
    provider: Pubkey,
    amount: u128,
    lp_tokens_minted: u128,
});

define_event!(LiquidityRemoved {
    market_id: u64,
    provider: Pubkey,
    lp_tokens_burned: u128,
    principal_paid: u128,
    fees_paid: u128,
    fees_forfeited: bool,
});

define_event!(SharesBought {
    market_id: u64,
    buyer: Pubkey,
    outcome: u8,
    shares: u128,
    cost: u128,
    protocol_fee: u128,
    lp_fee: u128,
    refund: u128,
});

define_event!(SharesSold {
    market_id: u64,
    seller: Pubkey,
    outcome: u8,
    shares: u128,
    payout: u128,
    protocol_fee: u128,
    lp_fee: u128,
});

define_event!(WinningsClaimed {
    market_id: u64,
    user: Pubkey,
    winning_shares: u128,
    payout: u128,
});

define_event!(LedgerAdjusted {
    market_id: u64,
    absorbed: u128,
});

define_event!(ProtocolFeesWithdrawn {
    recipient: Pubkey,
    amount: u128,
    remaining: u128,
});

define_event!(ConfigUpdated {
    authority: Pubkey,
    protocol_fee_bps: u16,
    lp_fee_bps: u16,
});

define_event!(CreatorUpdated {
    creator: Pubkey,
    allowed: bool,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload_decodes() {
        let event = SharesSold {
            market_id: 3,
            seller: Pubkey::new_unique(),
            outcome: 1,
            shares: 10,
            payout: 9,
            protocol_fee: 0,
            lp_fee: 1,
        };
        assert_eq!(SharesSold::event_type(), EventType::SharesSold);
        let bytes = event.try_to_vec().unwrap();
        let decoded = SharesSold::try_from_slice(&bytes).unwrap();
        assert_eq!(decoded, event);
    }
}
