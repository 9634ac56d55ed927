use memchr::memchr_iter;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::trace;

use super::reader::{RangeReader, SeekingReader};
use crate::aggregate::ScanTotals;
use crate::errors::{TallyError, TallyResult};
use crate::partition::ByteRange;

/// The byte counted when no other target is configured
pub const DEFAULT_TARGET_BYTE: u8 = 5;

/// Counts occurrences of `target` in `haystack`
pub fn count_byte(target: u8, haystack: &[u8]) -> u64 {
    memchr_iter(target, haystack).count() as u64
}

/// Walks a range in reads of at most `read_step` bytes
#[derive(Debug, Clone, Copy)]
pub struct ChunkedScanner {
    target: u8,
    read_step: NonZeroUsize,
}

impl ChunkedScanner {
    pub fn new(target: u8, read_step: NonZeroUsize) -> Self {
        Self { target, read_step }
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn read_step(&self) -> NonZeroUsize {
        self.read_step
    }

    /// Scans `range` through `reader` and returns the worker's subtotal.
    ///
    /// The buffer is allocated once, sized to the read step (or the range,
    /// if that is smaller), and reused for every read. An empty range
    /// performs no reads at all.
    pub fn scan_range<R>(&self, reader: &mut R, range: ByteRange) -> TallyResult<ScanTotals>
    where
        R: RangeReader + ?Sized,
    {
        let mut totals = ScanTotals::new();
        if range.is_empty() {
            return Ok(totals);
        }

        let step = self.read_step.get() as u64;
        let mut buffer = vec![0u8; step.min(range.len()) as usize];
        let mut pos = range.start;

        while pos < range.end {
            let wanted = (range.end - pos).min(step) as usize;
            let got = match reader.read_at_offset(pos, &mut buffer[..wanted]) {
                Ok(0) => return Err(TallyError::unexpected_eof(pos, range)),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TallyError::IoError(e)),
            };

            totals.read_calls += 1;
            if got < wanted {
                trace!("Short read at {}: {} of {} bytes", pos, got, wanted);
                totals.short_reads += 1;
            }
            totals.occurrences += count_byte(self.target, &buffer[..got]);
            totals.bytes_read += got as u64;
            pos += got as u64;
        }

        trace!(
            "Scanned {} with {} reads, {} occurrences",
            range,
            totals.read_calls,
            totals.occurrences
        );
        Ok(totals)
    }
}

/// Opens a private handle on `path` and scans `range` with it.
///
/// The handle is dropped on every return path.
pub fn scan_file(path: &Path, range: ByteRange, scanner: &ChunkedScanner) -> TallyResult<ScanTotals> {
    let mut reader = SeekingReader::open(path, range.start)?;
    scanner.scan_range(&mut reader, range)
}
