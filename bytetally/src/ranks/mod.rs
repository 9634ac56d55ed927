//! Distributed-memory execution: one isolated rank per range.
//!
//! Every rank receives a [`Communicator`] at construction carrying its rank
//! and the world size; nothing else is shared between ranks except the
//! read-only file handle opened once on their behalf. Each rank derives its
//! own range with [`range_for`], scans it with positioned reads, and hands its
//! subtotal to the collective [`Communicator::reduce_sum`]. Only rank 0 learns
//! the grand total.
//!
//! The reduction is a barrier that every rank must reach. A rank whose scan
//! fails still reaches it, carrying the failure instead of a subtotal, so a
//! bad range aborts the run instead of hanging it.
pub mod comm;

pub use comm::{world, Communicator, Contribution, ROOT_RANK};

use std::fs::File;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::aggregate::{log_totals, ScanTotals};
use crate::config::ScanPlan;
use crate::engine::{open_input, ExecutionModel};
use crate::errors::{TallyError, TallyResult};
use crate::partition::{chunk_size, partition, range_for};
use crate::results::TallyReport;
use crate::scan::{ChunkedScanner, PositionedReader};

/// Body of a single rank
fn run_rank(
    comm: Communicator,
    file: &File,
    file_size: u64,
    scanner: &ChunkedScanner,
) -> TallyResult<Option<ScanTotals>> {
    let rank = comm.rank();
    let range = range_for(file_size, comm.size(), rank)?;
    debug!("Rank {} scanning {}", rank, range);

    let mut reader = PositionedReader::new(file);
    let contribution = match scanner.scan_range(&mut reader, range) {
        Ok(totals) => Contribution::Totals(totals),
        Err(e) => {
            warn!("Rank {} failed on {}: {}", rank, range, e);
            Contribution::Failed {
                range,
                reason: e.to_string(),
            }
        }
    };
    comm.reduce_sum(contribution)
}

/// Runs the distributed model: `plan.workers` ranks, reduced onto rank 0
pub fn run(plan: &ScanPlan) -> TallyResult<TallyReport> {
    let started = Instant::now();
    let size = plan.workers.get();

    // Opened once for the whole world, released when `file` drops
    let (file, file_size) = open_input(&plan.path)?;
    let chunk = chunk_size(file_size, size)?;
    info!(
        "Scanning {} ({} bytes) with {} ranks, chunk size {}",
        plan.path.display(),
        file_size,
        size,
        chunk
    );

    let scanner = plan.scanner();
    let outcomes: Vec<TallyResult<Option<ScanTotals>>> = thread::scope(|s| {
        let mut handles = Vec::with_capacity(size);
        let mut spawn_errors = Vec::new();
        for comm in world(plan.workers) {
            let rank = comm.rank();
            let (file, scanner) = (&file, &scanner);
            // A rank that fails to spawn drops its communicator, which the
            // root observes as a departure instead of waiting on it.
            match thread::Builder::new()
                .name(format!("rank-{}", rank))
                .spawn_scoped(s, move || run_rank(comm, file, file_size, scanner))
            {
                Ok(handle) => handles.push((rank, handle)),
                Err(e) => spawn_errors.push(Err(TallyError::IoError(e))),
            }
        }

        let mut outcomes: Vec<_> = handles
            .into_iter()
            .map(|(rank, handle)| {
                handle.join().unwrap_or_else(|_| {
                    Err(TallyError::communicator(format!("rank {} panicked", rank)))
                })
            })
            .collect();
        outcomes.extend(spawn_errors);
        outcomes
    });

    // The root's outcome carries the reduced total or the first rank failure
    let mut root_totals = None;
    for outcome in outcomes {
        if let Some(totals) = outcome? {
            root_totals = Some(totals);
        }
    }
    let totals = root_totals
        .ok_or_else(|| TallyError::communicator("root rank produced no total"))?;
    log_totals(&totals, size);

    Ok(TallyReport {
        model: ExecutionModel::Distributed,
        file_size,
        chunk_size: chunk,
        target: plan.target,
        ranges: partition(file_size, size)?,
        threads: size,
        totals,
        elapsed: started.elapsed(),
    })
}
