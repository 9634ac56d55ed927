use anyhow::{Context, Result};
use bytetally::logging::init_logging;
use bytetally::sweep::{run_sweep, SweepConfig};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Time both execution models over a grid of worker counts and read steps
#[derive(Parser)]
#[command(name = "tally-sweep", author, version, about, long_about = None)]
struct Cli {
    /// File to scan
    #[arg(short = 'f', long = "file")]
    filename: PathBuf,

    /// Sweep description (YAML)
    #[arg(short = 's', long)]
    sweep: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("warn", cli.verbose);

    let sweep = SweepConfig::load_from(&cli.sweep)
        .with_context(|| format!("failed to load sweep {}", cli.sweep.display()))?;

    let progress = ProgressBar::new(sweep.num_jobs() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    let summary = run_sweep(&cli.filename, &sweep, |record| {
        progress.set_message(format!(
            "{} workers={} step={}",
            record.model, record.workers, record.read_step
        ));
        progress.inc(1);
    });
    progress.finish_and_clear();
    let summary = summary?;

    println!("{}", serde_json::to_string_pretty(&summary)?);

    let elapsed = Duration::from_millis(start.elapsed().as_millis() as u64);
    if summary.consistent {
        eprintln!(
            "{} {} runs in {}",
            "done:".green().bold(),
            summary.records.len(),
            humantime::format_duration(elapsed)
        );
    } else {
        eprintln!(
            "{} runs disagree on the grand total",
            "warning:".yellow().bold()
        );
    }
    Ok(())
}
