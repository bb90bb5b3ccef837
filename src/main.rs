use std::{fs::File, io::BufWriter};

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod coins;
mod sim;

/// Estimates how often a payment can be made without a change output.
#[derive(Parser)]
#[command(name = "nochange", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    sweep: sim::SweepConfig,
}

/// Logs go to stderr; stdout carries the report.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let config = Cli::parse().sweep;

    if let Err(err) = config.validate() {
        tracing::error!("Invalid configuration: {err}");
        std::process::exit(1);
    }
    tracing::info!(
        sizes = config.sizes().len(),
        tolerances = config.tolerances().len(),
        runs = config.runs,
        source = ?config.source,
        "starting sweep"
    );

    let tally = match sim::sweep(&config).await {
        Ok(tally) => tally,
        Err(err) => {
            tracing::error!("Failed to join the tally task: {err}");
            std::process::exit(1);
        }
    };

    let result = match &config.output {
        Some(path) => match File::create(path) {
            Ok(file) => sim::write_report(BufWriter::new(file), &config, &tally),
            Err(err) => Err(err.into()),
        },
        None => sim::write_report(std::io::stdout().lock(), &config, &tally),
    };
    if let Err(err) = result {
        tracing::error!("Error writing report: {err}");
        std::process::exit(1);
    }
}
