//! LMSR market maker for binary prediction markets
//!
//! Pricing core, market engine, fund-accounting ledger and the two
//! resolution policies (risk-sharing and zero-sum).

pub mod constants;
pub mod cpi;
pub mod engine;
pub mod error;
pub mod events;
pub mod instruction;
pub mod math;
pub mod processor;
pub mod resolution;
pub mod state;

pub use engine::{MarketEngine, RiskSharingEngine, ZeroSumEngine};
pub use error::MarketError;
pub use processor::Processor;
