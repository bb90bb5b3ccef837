//! Random wallet and payment synthesis for simulation trials.
use clap::ValueEnum;
use rand::{Rng, seq::SliceRandom};

use crate::coins::{Amount, DUST, MAX_AMOUNT, standard_denominations};

/// Where the coins of a random wallet are drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WalletSource {
    /// Coins are picked from the standard denomination set.
    Standard,
    /// Coins take any value above the dust floor up to the maximum amount.
    Uniform,
}

impl WalletSource {
    fn draw<R: Rng>(&self, rng: &mut R) -> Amount {
        match self {
            WalletSource::Standard => *standard_denominations()
                .choose(rng)
                .unwrap_or(&MAX_AMOUNT),
            WalletSource::Uniform => rng.gen_range(DUST + 1..=MAX_AMOUNT),
        }
    }
}

/// Draws `size` coins from `source`, sorted descending for the search.
pub fn random_wallet<R: Rng>(rng: &mut R, size: usize, source: WalletSource) -> Vec<Amount> {
    let mut wallet: Vec<Amount> = (0..size).map(|_| source.draw(rng)).collect();
    wallet.sort_unstable_by(|a, b| b.cmp(a));
    wallet
}

/// Picks a payment amount between one unit and the wallet's balance.
/// An empty wallet can only pay zero.
pub fn random_target<R: Rng>(rng: &mut R, wallet: &[Amount]) -> Amount {
    let balance: Amount = wallet.iter().sum();
    if balance == 0 {
        return 0;
    }
    rng.gen_range(1..=balance)
}
