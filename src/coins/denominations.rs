//! Construction of the standard denomination set wallets are sampled from.
use std::sync::OnceLock;

use crate::coins::{Amount, DUST, MAX_AMOUNT};

/// Process-wide standard set, built on first use.
static STANDARD: OnceLock<Vec<Amount>> = OnceLock::new();

/// Powers of `base` up to and including `ceiling`, starting at `base^0`.
fn powers(base: Amount, ceiling: Amount) -> impl Iterator<Item = Amount> {
    std::iter::successors(Some(1), move |&p: &Amount| p.checked_mul(base))
        .take_while(move |&p| p <= ceiling)
}

/// Every power of `base` scaled by each coefficient, keeping values within `ceiling`.
fn scaled_powers(
    base: Amount,
    coefficients: &'static [Amount],
    ceiling: Amount,
) -> impl Iterator<Item = Amount> {
    powers(base, ceiling).flat_map(move |p| {
        coefficients
            .iter()
            .filter_map(move |&c| p.checked_mul(c))
            .filter(move |&v| v <= ceiling)
    })
}

/// Builds the denomination set for the given dust floor and ceiling.
///
/// The set is the union of binary powers, 1-2 scaled powers of three and the
/// 1-2-5 preferred value series over powers of ten. Values at or below `dust`
/// are dropped; the result is ascending and free of duplicates.
pub fn denominations(dust: Amount, ceiling: Amount) -> Vec<Amount> {
    let mut values: Vec<Amount> = powers(2, ceiling)
        .chain(scaled_powers(3, &[1, 2], ceiling))
        .chain(scaled_powers(10, &[1, 2, 5], ceiling))
        .filter(|&v| v > dust)
        .collect();
    values.sort_unstable();
    values.dedup();
    values
}

/// The standard denomination set for [`DUST`] and [`MAX_AMOUNT`].
pub fn standard_denominations() -> &'static [Amount] {
    STANDARD.get_or_init(|| {
        let set = denominations(DUST, MAX_AMOUNT);
        tracing::debug!(count = set.len(), "built standard denomination set");
        set
    })
}
