use anyhow::{Context, Result};
use bytetally::generate::{generate_input, GenerateOptions};
use bytetally::logging::init_logging;
use bytetally::DEFAULT_TARGET_BYTE;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

/// Generate a file of random 4-byte little-endian integers for tallying
#[derive(Parser)]
#[command(name = "tally-gen", author, version, about, long_about = None)]
struct Cli {
    /// Number of integers to write
    #[arg(short = 'n', long)]
    count: u64,

    /// Largest value written (inclusive)
    #[arg(short = 'm', long = "max", default_value_t = 10)]
    max_value: u32,

    /// Seed for a reproducible file
    #[arg(long)]
    seed: Option<u64>,

    /// Output file
    #[arg(short = 'o', long, default_value = "random_numbers.bin")]
    output: PathBuf,

    /// Byte value whose occurrences are reported
    #[arg(long, default_value_t = DEFAULT_TARGET_BYTE)]
    target: u8,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("warn", cli.verbose);

    let start = Instant::now();
    let options = GenerateOptions {
        count: cli.count,
        max_value: cli.max_value,
        seed: cli.seed,
        target: cli.target,
    };
    let summary = generate_input(&cli.output, &options)
        .with_context(|| format!("failed to generate {}", cli.output.display()))?;

    println!(
        "Number of {}s generated: {}",
        cli.target, summary.target_occurrences
    );
    println!(
        "Generated {} random integers and saved to {} ({} bytes)",
        summary.integers,
        cli.output.display(),
        summary.bytes
    );
    tracing::info!(
        "Generation took {}",
        humantime::format_duration(start.elapsed())
    );
    Ok(())
}
