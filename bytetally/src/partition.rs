//! Static partitioning of a file into per-worker byte ranges.
//!
//! The file is cut into `n` contiguous half-open ranges of `file_size / n`
//! bytes each; the last range absorbs the truncated remainder. When the file
//! is smaller than the worker count the leading ranges are empty, which is a
//! valid partition: those workers simply perform no reads.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::errors::{TallyError, TallyResult};

/// A half-open `[start, end)` interval of byte offsets owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "range start {} past end {}", start, end);
        Self { start, end }
    }

    /// Number of bytes covered by the range
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

fn check_workers(workers: usize) -> TallyResult<u64> {
    if workers == 0 {
        return Err(TallyError::invalid_configuration(
            "worker count must be at least 1",
        ));
    }
    Ok(workers as u64)
}

/// Bytes assigned to every worker except possibly the last
pub fn chunk_size(file_size: u64, workers: usize) -> TallyResult<u64> {
    Ok(file_size / check_workers(workers)?)
}

/// Computes the range of a single worker without building the whole partition.
///
/// Ranks in the distributed model call this with their own index, so every
/// rank agrees on the layout without exchanging any messages.
pub fn range_for(file_size: u64, workers: usize, index: usize) -> TallyResult<ByteRange> {
    let n = check_workers(workers)?;
    let index = index as u64;
    if index >= n {
        return Err(TallyError::invalid_configuration(format!(
            "worker index {} out of bounds for {} workers",
            index, n
        )));
    }

    let chunk = file_size / n;
    let start = index * chunk;
    let end = if index == n - 1 {
        file_size
    } else {
        start + chunk
    };
    Ok(ByteRange::new(start, end))
}

/// Splits `file_size` bytes into exactly `workers` contiguous ranges
pub fn partition(file_size: u64, workers: usize) -> TallyResult<Vec<ByteRange>> {
    check_workers(workers)?;
    let ranges = (0..workers)
        .map(|index| range_for(file_size, workers, index))
        .collect::<TallyResult<Vec<_>>>()?;

    debug!(
        "Partitioned {} bytes into {} ranges of {} bytes",
        file_size,
        workers,
        file_size / workers as u64
    );
    Ok(ranges)
}
