//! Types used throughout coin selection.

/// Amount type, an unsigned count of the smallest indivisible unit.
pub type Amount = u64;

/// Number of units in one whole coin.
/// Used once to scale the standard denomination ceiling.
pub const COIN: Amount = 100_000_000;

/// Largest denomination a standard wallet may hold.
pub const MAX_AMOUNT: Amount = 8 * COIN;

/// Denominations at or below this floor are considered dust and never generated.
pub const DUST: Amount = 900;
