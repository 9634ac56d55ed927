use bytetally::logging::init_logging;
use bytetally::{tally, ExecutionModel, TallyConfig, TallyResult};
use bytetally_cli::{print_layout, print_total, report_error};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Count a byte value across a file with isolated ranks and a collective
/// reduction.
///
/// The number of ranks comes from the launch environment
/// (BYTETALLY_WORKERS or a config file), defaulting to one per CPU.
#[derive(Parser)]
#[command(name = "tally-ranks", author, version, about, long_about = None)]
struct Cli {
    /// File to scan
    filename: PathBuf,

    /// Maximum number of bytes per read
    read_step: usize,

    /// Configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Byte value to count
    #[arg(long)]
    target: Option<u8>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const USAGE: &str = "Usage: tally-ranks <filename> <read_step>";

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            if e.is_configuration() {
                eprintln!("{}", USAGE);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> TallyResult<()> {
    let cli_config = TallyConfig {
        path: Some(cli.filename),
        read_step: Some(cli.read_step),
        ..TallyConfig::default()
    };
    let mut config = TallyConfig::load_from(cli.config.as_deref())?
        .merge_with_cli(cli_config)
        .or_default_workers();
    if let Some(target) = cli.target {
        config.target_byte = target;
    }
    init_logging(&config.log_level, cli.verbose);

    let plan = config.validate()?;
    let report = tally(&plan, ExecutionModel::Distributed)?;

    print_layout(&report);
    print_total(&report);
    Ok(())
}
