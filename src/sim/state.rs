//! The `Tally` module collects trial outcomes and runs the simulation sweep.
use std::collections::HashMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::{sync::mpsc, task::JoinError};

use crate::{
    coins::{Amount, WalletSource, random_target, random_wallet, search},
    sim::SweepConfig,
};

/// The size of the channel carrying cell outcomes.
const CHANNEL_SIZE: usize = 1024;

/// A point on the sweep grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Number of coins in each simulated wallet.
    pub size: usize,
    /// Accepted overpayment above the target.
    pub tolerance: Amount,
}

/// Trials finished for a cell, sent to the tally.
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    pub cell: Cell,
    pub count: Count,
}

/// Pass and run counts for one cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Count {
    pub runs: usize,
    pub successes: usize,
}

/// Runs one trial: a fresh wallet, a fresh target and a single search.
pub fn run_trial<R: Rng>(rng: &mut R, cell: Cell, source: WalletSource) -> bool {
    let wallet = random_wallet(rng, cell.size, source);
    let target = random_target(rng, &wallet);
    search(&wallet, target, cell.tolerance).is_ok()
}

/// Runs `runs` trials for `cell` and returns how many succeeded.
pub fn run_cell<R: Rng>(rng: &mut R, cell: Cell, runs: usize, source: WalletSource) -> usize {
    (0..runs)
        .filter(|_| run_trial(rng, cell, source))
        .count()
}

/// Aggregates trial outcomes per cell.
pub struct Tally {
    /// Counts keyed by grid cell.
    counts: HashMap<Cell, Count>,
    /// A channel receiver for incoming cell outcomes.
    receiver: mpsc::Receiver<Outcome>,
}

impl Tally {
    /// Creates an empty tally reading from `receiver`.
    pub fn new(receiver: mpsc::Receiver<Outcome>) -> Self {
        Tally {
            counts: HashMap::new(),
            receiver,
        }
    }

    /// Adds an outcome to the counts of its cell.
    fn record(&mut self, outcome: Outcome) {
        let count = self.counts.entry(outcome.cell).or_default();
        count.runs += outcome.count.runs;
        count.successes += outcome.count.successes;
    }

    /// Counts for a cell, zero if no trial reported it.
    pub fn count(&self, cell: Cell) -> Count {
        self.counts.get(&cell).copied().unwrap_or_default()
    }

    /// Fraction of successful trials in a cell, zero when it has none.
    pub fn success_rate(&self, cell: Cell) -> f64 {
        let count = self.count(cell);
        if count.runs == 0 {
            return 0.0;
        }
        count.successes as f64 / count.runs as f64
    }

    /// Success rates with one row per wallet size and one column per tolerance.
    pub fn matrix(&self, sizes: &[usize], tolerances: &[Amount]) -> Vec<Vec<f64>> {
        sizes
            .iter()
            .map(|&size| {
                tolerances
                    .iter()
                    .map(|&tolerance| self.success_rate(Cell { size, tolerance }))
                    .collect()
            })
            .collect()
    }

    /// Runs the tally loop until every sender has been dropped.
    pub async fn run(&mut self) {
        while let Some(outcome) = self.receiver.recv().await {
            self.record(outcome);
        }
    }
}

/// Runs every cell of the configured grid and returns the filled tally.
///
/// Each cell gets its own blocking worker and random generator. With a seed,
/// the generator of cell `i` is seeded with `seed + i`, so results repeat.
pub async fn sweep(config: &SweepConfig) -> Result<Tally, JoinError> {
    let (sender, receiver) = mpsc::channel(CHANNEL_SIZE);
    let mut tally = Tally::new(receiver);

    let handle = tokio::spawn(async move {
        tally.run().await;
        tally
    });

    let sizes = config.sizes();
    let tolerances = config.tolerances();
    let cells = sizes
        .iter()
        .flat_map(|&size| {
            tolerances
                .iter()
                .map(move |&tolerance| Cell { size, tolerance })
        })
        .enumerate();

    let mut workers = Vec::new();
    for (index, cell) in cells {
        let sender = sender.clone();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        };
        let (runs, source) = (config.runs, config.source);
        workers.push(tokio::task::spawn_blocking(move || {
            let successes = run_cell(&mut rng, cell, runs, source);
            tracing::debug!(
                size = cell.size,
                tolerance = cell.tolerance,
                successes,
                "cell finished"
            );
            let count = Count { runs, successes };
            if let Err(err) = sender.blocking_send(Outcome { cell, count }) {
                tracing::error!("Error sending cell outcome: {err}");
            }
        }));
    }
    drop(sender); // Close the original sender so the tally ends with the workers

    for worker in workers {
        if let Err(err) = worker.await {
            tracing::error!("Simulation worker failed: {err}");
        }
    }

    handle.await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::config::tests::config;

    #[tokio::test]
    async fn test_tally_sums_outcomes() {
        let (sender, receiver) = mpsc::channel(16);
        let mut tally = Tally::new(receiver);
        let cell = Cell {
            size: 3,
            tolerance: 100,
        };
        for (runs, successes) in [(3, 2), (1, 1)] {
            let count = Count { runs, successes };
            sender.send(Outcome { cell, count }).await.unwrap();
        }
        drop(sender);
        tally.run().await;

        assert_eq!(
            tally.count(cell),
            Count {
                runs: 4,
                successes: 3
            }
        );
        assert_eq!(tally.success_rate(cell), 0.75);
        assert_eq!(
            tally.success_rate(Cell {
                size: 1,
                tolerance: 0
            }),
            0.0
        );
    }

    #[test]
    fn test_run_cell_counts() {
        let mut rng = StdRng::seed_from_u64(5);
        let cell = Cell {
            size: 5,
            tolerance: 0,
        };
        let successes = run_cell(&mut rng, cell, 50, WalletSource::Standard);
        assert!(successes <= 50);
    }

    #[test]
    fn test_empty_wallet_pays_zero() {
        // target is zero for an empty wallet, which the empty selection meets
        let mut rng = StdRng::seed_from_u64(6);
        let cell = Cell {
            size: 0,
            tolerance: 0,
        };
        assert_eq!(run_cell(&mut rng, cell, 10, WalletSource::Uniform), 10);
    }

    #[test]
    fn test_single_coin_full_tolerance() {
        // with one coin the target is at most its value, so the coin always fits
        let mut rng = StdRng::seed_from_u64(8);
        let cell = Cell {
            size: 1,
            tolerance: Amount::MAX,
        };
        assert_eq!(run_cell(&mut rng, cell, 25, WalletSource::Uniform), 25);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sweep_fills_grid() {
        let config = config();
        let tally = sweep(&config).await.unwrap();
        let sizes = config.sizes();
        let tolerances = config.tolerances();
        for &size in &sizes {
            for &tolerance in &tolerances {
                assert_eq!(tally.count(Cell { size, tolerance }).runs, config.runs);
            }
        }
        let matrix = tally.matrix(&sizes, &tolerances);
        assert_eq!(matrix.len(), sizes.len());
        assert!(matrix.iter().all(|row| row.len() == tolerances.len()));
        assert!(matrix.iter().flatten().all(|rate| (0.0..=1.0).contains(rate)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_seeded_sweep_repeats() {
        let config = config();
        let first = sweep(&config).await.unwrap();
        let second = sweep(&config).await.unwrap();
        let (sizes, tolerances) = (config.sizes(), config.tolerances());
        assert_eq!(
            first.matrix(&sizes, &tolerances),
            second.matrix(&sizes, &tolerances)
        );
    }
}
