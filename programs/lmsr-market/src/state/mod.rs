pub mod config;
pub mod ledger;
pub mod market;
pub mod position;

pub use config::*;
pub use ledger::*;
pub use market::*;
pub use position::*;
