//! Output shared by the launchers.
//!
//! Everything written to stdout here is the launchers' result surface; logs
//! and diagnostics go to stderr.

use bytetally::{TallyError, TallyReport};
use colored::Colorize;

/// Prints the file size and chunk size lines
pub fn print_layout(report: &TallyReport) {
    println!("File size: {}", report.file_size);
    println!("Chunk size: {}", report.chunk_size);
}

/// Prints the worker thread count and one line per dispatched task.
///
/// These lines are written once the run has finished, in task order. The
/// dispatch-time record is the `info!` log emitted as each task is spawned.
pub fn print_dispatch(report: &TallyReport) {
    println!("Number of worker threads: {}", report.threads);
    for (task, range) in report.ranges.iter().enumerate() {
        println!("Task {} reading chunk [{} - {}]", task, range.start, range.end);
    }
}

pub fn print_total(report: &TallyReport) {
    println!(
        "Total occurrences of {}: {}",
        report.target,
        report.grand_total()
    );
}

/// Writes a diagnostic for a fatal error to stderr
pub fn report_error(err: &TallyError) {
    eprintln!("{} {}", "error:".red().bold(), err);
}
