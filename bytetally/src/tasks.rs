//! Shared-memory execution: one process, a pool of worker threads, one task
//! per range.
//!
//! The coordinating thread enumerates the partition inside a
//! [`rayon::scope`], spawning one task per range. Tasks are picked up by
//! whichever pool thread is free, so the task count is independent of the
//! thread count. Each task opens its own handle, keeps its subtotal private
//! while scanning, and publishes it with one atomic add. The end of the scope
//! is the join point; the grand total is only read after it.

use once_cell::sync::OnceCell;
use rayon::ThreadPoolBuilder;
use std::io;
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregate::AtomicTotals;
use crate::config::ScanPlan;
use crate::engine::{open_input, ExecutionModel};
use crate::errors::{TallyError, TallyResult};
use crate::partition::{chunk_size, partition};
use crate::results::TallyReport;
use crate::scan::scan_file;

/// Runs the shared-memory model: `plan.workers` tasks on `plan.threads` threads
pub fn run(plan: &ScanPlan) -> TallyResult<TallyReport> {
    let started = Instant::now();
    let tasks = plan.workers.get();

    // Measure, then release the handle; every task opens its own
    let file_size = {
        let (_file, file_size) = open_input(&plan.path)?;
        file_size
    };
    let chunk = chunk_size(file_size, tasks)?;
    let ranges = partition(file_size, tasks)?;
    info!(
        "Scanning {} ({} bytes) as {} tasks on {} threads, chunk size {}",
        plan.path.display(),
        file_size,
        tasks,
        plan.threads,
        chunk
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(plan.threads.get())
        .thread_name(|i| format!("tally-worker-{}", i))
        .build()
        .map_err(|e| TallyError::IoError(io::Error::new(io::ErrorKind::Other, e)))?;

    let scanner = plan.scanner();
    let totals = AtomicTotals::new();
    let failure: OnceCell<TallyError> = OnceCell::new();

    pool.scope(|s| {
        for (task, range) in ranges.iter().copied().enumerate() {
            info!("Task {} reading chunk [{} - {}]", task, range.start, range.end);
            let (totals, failure, scanner, path) = (&totals, &failure, &scanner, &plan.path);
            s.spawn(move |_| match scan_file(path, range, scanner) {
                Ok(subtotal) => totals.add(subtotal),
                Err(e) => {
                    warn!("Task {} failed on {}: {}", task, range, e);
                    let _ = failure.set(TallyError::worker_failed(task, range, e.to_string()));
                }
            });
        }
    });

    if let Some(err) = failure.into_inner() {
        return Err(err);
    }

    Ok(TallyReport {
        model: ExecutionModel::SharedMemory,
        file_size,
        chunk_size: chunk,
        target: plan.target,
        ranges,
        threads: plan.threads.get(),
        totals: totals.finish(),
        elapsed: started.elapsed(),
    })
}
