use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, info};

/// Per-worker scan counters.
///
/// `occurrences` is the worker's subtotal; the remaining fields describe the
/// I/O it took to produce it. Totals combine by element-wise sum, so the same
/// type serves as a subtotal and as the grand total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTotals {
    /// Bytes equal to the target byte
    pub occurrences: u64,
    pub bytes_read: u64,
    pub read_calls: u64,
    /// Reads that returned fewer bytes than requested
    pub short_reads: u64,
}

impl ScanTotals {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Add for ScanTotals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            occurrences: self.occurrences + other.occurrences,
            bytes_read: self.bytes_read + other.bytes_read,
            read_calls: self.read_calls + other.read_calls,
            short_reads: self.short_reads + other.short_reads,
        }
    }
}

impl AddAssign for ScanTotals {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for ScanTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Shared accumulator for the shared-memory model.
///
/// Tasks keep their counters private while scanning and publish them with a
/// single [`AtomicTotals::add`] when their range is exhausted. Reading the
/// result consumes the accumulator, so it can only happen once every task has
/// released its borrow, i.e. after the join point.
#[derive(Debug, Default)]
pub struct AtomicTotals {
    occurrences: AtomicU64,
    bytes_read: AtomicU64,
    read_calls: AtomicU64,
    short_reads: AtomicU64,
    contributions: AtomicUsize,
}

impl AtomicTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one finished worker's totals into the grand total
    pub fn add(&self, subtotal: ScanTotals) {
        self.occurrences
            .fetch_add(subtotal.occurrences, Ordering::AcqRel);
        self.bytes_read
            .fetch_add(subtotal.bytes_read, Ordering::AcqRel);
        self.read_calls
            .fetch_add(subtotal.read_calls, Ordering::AcqRel);
        self.short_reads
            .fetch_add(subtotal.short_reads, Ordering::AcqRel);
        let seen = self.contributions.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(
            "Accumulated subtotal {} ({} contributions so far)",
            subtotal.occurrences, seen
        );
    }

    /// Number of subtotals folded in so far
    pub fn contributions(&self) -> usize {
        self.contributions.load(Ordering::Acquire)
    }

    /// Consumes the accumulator and returns the grand total
    pub fn finish(self) -> ScanTotals {
        let totals = ScanTotals {
            occurrences: self.occurrences.into_inner(),
            bytes_read: self.bytes_read.into_inner(),
            read_calls: self.read_calls.into_inner(),
            short_reads: self.short_reads.into_inner(),
        };
        log_totals(&totals, self.contributions.into_inner());
        totals
    }
}

/// Logs I/O statistics for a finished run
pub fn log_totals(totals: &ScanTotals, workers: usize) {
    info!(
        "Scan stats:\n\
         Workers: {}\n\
         Occurrences: {}\n\
         Bytes read: {}\n\
         Read calls (short): {} ({})",
        workers, totals.occurrences, totals.bytes_read, totals.read_calls, totals.short_reads
    );
}
