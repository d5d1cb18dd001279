//! Collaborator boundaries
//!
//! The engine reaches the outside world only through these traits. Any
//! error they return is surfaced to callers as
//! `MarketError::CollaboratorUnavailable`.

pub mod token_ledger;
pub mod value_transfer;

pub use token_ledger::{InMemoryTokenLedger, TokenId, TokenLedger};
pub use value_transfer::{InMemoryTreasury, ValueTransfer};
