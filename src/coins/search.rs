//! Bounded subset-sum search for payments that need no change output.
use thiserror::Error;

use crate::coins::Amount;

/// The traversal ran out of coins without landing inside the tolerance band.
///
/// This is the expected outcome for a large share of random trials and is
/// counted by the simulation, not reported as a fault.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no selection found within tolerance")]
pub struct SearchExhausted;

/// Searches `wallet` for coins summing into `[target, target + tolerance]`.
///
/// The wallet must be sorted descending. Coins are considered largest first and
/// each coin is visited once: it is either kept in the selection or, when it
/// pushes the total past the band, dropped for good. The walk can therefore
/// miss subsets an exhaustive search would find; the first selection reached
/// in this order is returned.
///
/// A `target` of zero is met by the empty selection.
pub fn search(
    wallet: &[Amount],
    target: Amount,
    tolerance: Amount,
) -> Result<Vec<Amount>, SearchExhausted> {
    let upper = target.saturating_add(tolerance);
    let mut remaining = wallet.iter().rev().copied().collect::<Vec<_>>();
    let mut selection = Vec::with_capacity(wallet.len());
    let mut total: Amount = 0;

    loop {
        if total < target {
            if let Some(coin) = remaining.pop() {
                selection.push(coin);
                total += coin;
                continue;
            }
            // Nothing left to add and still short.
            return Err(SearchExhausted);
        }
        if total <= upper {
            return Ok(selection);
        }
        match selection.pop() {
            Some(coin) => total -= coin,
            None => return Err(SearchExhausted),
        }
    }
}
