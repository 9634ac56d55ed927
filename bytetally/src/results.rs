use serde::Serialize;
use std::time::Duration;

use crate::aggregate::ScanTotals;
use crate::engine::ExecutionModel;
use crate::partition::ByteRange;

/// Outcome of a complete run, produced by the driver once every worker has
/// finished and the subtotals have been combined
#[derive(Debug, Clone, Serialize)]
pub struct TallyReport {
    pub model: ExecutionModel,
    /// Size of the input, measured once before partitioning
    pub file_size: u64,
    /// `file_size / workers`, the length of every range but the last
    pub chunk_size: u64,
    /// Byte value that was counted
    pub target: u8,
    /// The partition, one range per worker in worker order
    pub ranges: Vec<ByteRange>,
    /// Threads that executed the workers
    pub threads: usize,
    /// Grand total and I/O counters summed over every worker
    pub totals: ScanTotals,
    pub elapsed: Duration,
}

impl TallyReport {
    /// Number of occurrences of the target byte in the whole file
    pub fn grand_total(&self) -> u64 {
        self.totals.occurrences
    }

    pub fn workers(&self) -> usize {
        self.ranges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accessors() {
        let report = TallyReport {
            model: ExecutionModel::SharedMemory,
            file_size: 10,
            chunk_size: 3,
            target: 5,
            ranges: vec![
                ByteRange::new(0, 3),
                ByteRange::new(3, 6),
                ByteRange::new(6, 10),
            ],
            threads: 2,
            totals: ScanTotals {
                occurrences: 4,
                bytes_read: 10,
                read_calls: 3,
                short_reads: 0,
            },
            elapsed: Duration::from_millis(3),
        };
        assert_eq!(report.grand_total(), 4);
        assert_eq!(report.workers(), 3);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["model"], "shared-memory");
        assert_eq!(json["totals"]["occurrences"], 4);
        assert_eq!(json["ranges"][2]["end"], 10);
    }
}
