use bytetally::logging::init_logging;
use bytetally::{tally, ExecutionModel, TallyConfig, TallyError, TallyResult};
use bytetally_cli::{print_dispatch, print_layout, print_total, report_error};
use clap::error::ErrorKind;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Count a byte value across a file with one task per chunk on a shared
/// worker pool.
#[derive(Parser)]
#[command(name = "tally-tasks", author, version, about, long_about = None)]
struct Cli {
    /// File to scan
    #[arg(short = 'f', long = "file")]
    filename: Option<PathBuf>,

    /// Number of tasks (chunks) to split the file into
    #[arg(short = 't', long = "tasks")]
    task_count: Option<usize>,

    /// Maximum number of bytes per read
    #[arg(short = 'r', long)]
    read_step: Option<usize>,

    /// Number of worker threads (default: CPU cores)
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

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

const USAGE: &str = "Usage: tally-tasks -f filename -t task_count -r read_step";

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
    // The three flags are mandatory here; config files and the environment
    // may not stand in for them
    let (Some(filename), Some(task_count), Some(read_step)) =
        (cli.filename, cli.task_count, cli.read_step)
    else {
        return Err(TallyError::invalid_configuration(
            "-f, -t and -r are all required",
        ));
    };

    let cli_config = TallyConfig {
        path: Some(filename),
        workers: Some(task_count),
        read_step: Some(read_step),
        ..TallyConfig::default()
    };
    let mut config = TallyConfig::load_from(cli.config.as_deref())?.merge_with_cli(cli_config);
    if let Some(target) = cli.target {
        config.target_byte = target;
    }
    if let Some(threads) = cli.threads {
        config.thread_count = threads;
    }
    init_logging(&config.log_level, cli.verbose);

    let plan = config.validate()?;
    let report = tally(&plan, ExecutionModel::SharedMemory)?;

    print_layout(&report);
    print_dispatch(&report);
    print_total(&report);
    Ok(())
}
