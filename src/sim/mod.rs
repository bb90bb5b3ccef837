//! Simulation module for sweeping wallet sizes and tolerances and reporting success rates.
mod config;
mod report;
mod state;

pub use config::*;
pub use report::*;
pub use state::*;
