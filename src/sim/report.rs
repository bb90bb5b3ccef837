//! Rendering of sweep results as tab-separated tables and gnuplot scripts.
use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

use crate::{
    coins::Amount,
    sim::{Cell, SweepConfig, Tally},
};

/// Field delimiter of every report.
const DELIMITER: u8 = b'\t';

/// Image written by the gnuplot script when no output path is given.
const DEFAULT_IMAGE: &str = "nochange.png";

/// Report layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Wallet sizes as rows and tolerances as columns.
    Matrix,
    /// One record per grid cell.
    Long,
}

/// A grid cell's results in the long layout.
#[derive(Serialize, Debug)]
pub struct CellSummary {
    size: usize,
    tolerance: Amount,
    runs: usize,
    successes: usize,
    rate: f64,
}

/// Errors that can occur while writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode report: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes the tally in the configured layout.
pub fn write_report<W: Write>(
    writer: W,
    config: &SweepConfig,
    tally: &Tally,
) -> Result<(), ReportError> {
    let sizes = config.sizes();
    let tolerances = config.tolerances();
    match config.format {
        OutputFormat::Matrix => write_matrix(writer, config, tally, &sizes, &tolerances),
        OutputFormat::Long => write_long(writer, tally, &sizes, &tolerances),
    }
}

fn write_matrix<W: Write>(
    mut writer: W,
    config: &SweepConfig,
    tally: &Tally,
    sizes: &[usize],
    tolerances: &[Amount],
) -> Result<(), ReportError> {
    if config.plot {
        write_preamble(&mut writer, config)?;
    }

    let mut table = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .from_writer(&mut writer);
    let header = std::iter::once("size".to_string())
        .chain(tolerances.iter().map(|tolerance| tolerance.to_string()));
    table.write_record(header)?;
    for (size, rates) in sizes.iter().zip(tally.matrix(sizes, tolerances)) {
        let row = std::iter::once(size.to_string())
            .chain(rates.iter().map(|rate| rate.to_string()));
        table.write_record(row)?;
    }
    table.flush()?;
    drop(table);

    if config.plot {
        write_postamble(&mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_long<W: Write>(
    writer: W,
    tally: &Tally,
    sizes: &[usize],
    tolerances: &[Amount],
) -> Result<(), ReportError> {
    let mut table = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);
    for &size in sizes {
        for &tolerance in tolerances {
            let cell = Cell { size, tolerance };
            let count = tally.count(cell);
            table.serialize(CellSummary {
                size,
                tolerance,
                runs: count.runs,
                successes: count.successes,
                rate: tally.success_rate(cell),
            })?;
        }
    }
    table.flush()?;
    Ok(())
}

/// Image path for the plot, derived from the output path when there is one.
fn image_path(config: &SweepConfig) -> String {
    config
        .output
        .as_ref()
        .map(|path| path.with_extension("png").display().to_string())
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string())
}

fn write_preamble<W: Write>(writer: &mut W, config: &SweepConfig) -> std::io::Result<()> {
    writeln!(writer, "set terminal pngcairo size 1024,768")?;
    writeln!(writer, "set output '{}'", image_path(config))?;
    writeln!(
        writer,
        "set title 'No-change success rate, {} runs per cell'",
        config.runs
    )?;
    writeln!(writer, "set xlabel 'tolerance'")?;
    writeln!(writer, "set ylabel 'wallet size'")?;
    writeln!(writer, "set cblabel 'success rate'")?;
    writeln!(writer, "set cbrange [0:1]")?;
    writeln!(writer, "set datafile separator tab")?;
    writeln!(writer, "plot '-' matrix rowheaders columnheaders with image")
}

fn write_postamble<W: Write>(writer: &mut W) -> std::io::Result<()> {
    // gnuplot expects two end markers after inline matrix data
    writeln!(writer, "e")?;
    writeln!(writer, "e")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tokio::sync::mpsc;

    use super::*;
    use crate::sim::{Count, Outcome, config::tests::config};

    async fn tally(outcomes: &[(usize, Amount, usize, usize)]) -> Tally {
        let (sender, receiver) = mpsc::channel(outcomes.len().max(1));
        let mut tally = Tally::new(receiver);
        for &(size, tolerance, runs, successes) in outcomes {
            let cell = Cell { size, tolerance };
            let count = Count { runs, successes };
            sender.send(Outcome { cell, count }).await.unwrap();
        }
        drop(sender);
        tally.run().await;
        tally
    }

    fn small_config() -> SweepConfig {
        let mut config = config();
        config.max_size = 2;
        config.max_tolerance = 1_000;
        config
    }

    fn render(config: &SweepConfig, tally: &Tally) -> String {
        let mut out = Vec::new();
        write_report(&mut out, config, tally).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_matrix_report() {
        let tally = tally(&[(1, 0, 2, 1), (2, 1_000, 1, 1)]).await;
        let output = render(&small_config(), &tally);
        assert_eq!(output, "size\t0\t1000\n1\t0.5\t0\n2\t0\t1\n");
    }

    #[tokio::test]
    async fn test_long_report() {
        let tally = tally(&[(1, 0, 2, 1)]).await;
        let mut config = small_config();
        config.max_size = 1;
        config.max_tolerance = 0;
        config.format = OutputFormat::Long;
        let output = render(&config, &tally);
        assert_eq!(
            output,
            "size\ttolerance\truns\tsuccesses\trate\n1\t0\t2\t1\t0.5\n"
        );
    }

    #[tokio::test]
    async fn test_plot_script() {
        let tally = tally(&[(1, 0, 1, 1)]).await;
        let mut config = small_config();
        config.plot = true;
        config.output = Some(PathBuf::from("out/rates.gp"));
        let output = render(&config, &tally);

        assert!(output.starts_with("set terminal pngcairo"));
        assert!(output.contains("set output 'out/rates.png'\n"));
        assert!(output.contains(
            "plot '-' matrix rowheaders columnheaders with image\nsize\t0\t1000\n1\t1\t0\n"
        ));
        assert!(output.ends_with("2\t0\t0\ne\ne\n"));
    }

    #[test]
    fn test_default_image_path() {
        assert_eq!(image_path(&config()), DEFAULT_IMAGE);
    }
}
