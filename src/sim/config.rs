//! Sweep configuration parsed from the command line.
use std::path::PathBuf;

use clap::Args;
use thiserror::Error;

use crate::{
    coins::{Amount, WalletSource},
    sim::OutputFormat,
};

/// Grid of wallet sizes and tolerances to simulate, and how to report it.
#[derive(Args, Debug, Clone)]
pub struct SweepConfig {
    /// Smallest wallet size simulated.
    #[arg(long, default_value_t = 1)]
    pub min_size: usize,

    /// Largest wallet size simulated.
    #[arg(long, default_value_t = 30)]
    pub max_size: usize,

    /// Increment between simulated wallet sizes.
    #[arg(long, default_value_t = 1)]
    pub size_step: usize,

    /// Smallest accepted overpayment, in units.
    #[arg(long, default_value_t = 0)]
    pub min_tolerance: Amount,

    /// Largest accepted overpayment, in units.
    #[arg(long, default_value_t = 10_000)]
    pub max_tolerance: Amount,

    /// Increment between simulated tolerances.
    #[arg(long, default_value_t = 1_000)]
    pub tolerance_step: Amount,

    /// Trials per (wallet size, tolerance) pair.
    #[arg(long, default_value_t = 1_000)]
    pub runs: usize,

    /// Where wallet coins are drawn from.
    #[arg(long, value_enum, default_value_t = WalletSource::Standard)]
    pub source: WalletSource,

    /// Layout of the written report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Matrix)]
    pub format: OutputFormat,

    /// Wrap the matrix in a gnuplot script.
    #[arg(long, default_value_t = false)]
    pub plot: bool,

    /// File to write the report to instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Seed for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SweepConfig {
    /// Checks the ranges and counts before any trial runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_size > self.max_size {
            return Err(ConfigError::SizeRange(self.min_size, self.max_size));
        }
        if self.min_tolerance > self.max_tolerance {
            return Err(ConfigError::ToleranceRange(
                self.min_tolerance,
                self.max_tolerance,
            ));
        }
        if self.size_step == 0 || self.tolerance_step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        if self.runs == 0 {
            return Err(ConfigError::NoRuns);
        }
        if self.plot && self.format != OutputFormat::Matrix {
            return Err(ConfigError::PlotNeedsMatrix);
        }
        Ok(())
    }

    /// Wallet sizes on the grid, ascending.
    pub fn sizes(&self) -> Vec<usize> {
        (self.min_size..=self.max_size)
            .step_by(self.size_step.max(1))
            .collect()
    }

    /// Tolerances on the grid, ascending.
    pub fn tolerances(&self) -> Vec<Amount> {
        let step = usize::try_from(self.tolerance_step.max(1)).unwrap_or(usize::MAX);
        (self.min_tolerance..=self.max_tolerance)
            .step_by(step)
            .collect()
    }
}

/// Errors in a sweep configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Minimum wallet size {0} exceeds maximum {1}")]
    SizeRange(usize, usize),
    #[error("Minimum tolerance {0} exceeds maximum {1}")]
    ToleranceRange(Amount, Amount),
    #[error("Step sizes must be positive")]
    ZeroStep,
    #[error("At least one run per cell is required")]
    NoRuns,
    #[error("Plotting requires the matrix output format")]
    PlotNeedsMatrix,
}
