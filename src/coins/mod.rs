//! Coin module for denomination generation, wallet synthesis and coin selection.
mod denominations;
mod search;
mod types;
mod wallet;

pub use denominations::*;
pub use search::*;
pub use types::*;
pub use wallet::*;
