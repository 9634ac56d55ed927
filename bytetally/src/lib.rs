pub mod aggregate;
pub mod config;
pub mod engine;
pub mod errors;
pub mod generate;
pub mod logging;
pub mod partition;
pub mod ranks;
pub mod results;
pub mod scan;
pub mod sweep;
pub mod tasks;

pub use aggregate::{AtomicTotals, ScanTotals};
pub use config::{ScanPlan, TallyConfig};
pub use engine::{tally, ExecutionModel};
pub use errors::{TallyError, TallyResult};
pub use partition::{partition, ByteRange};
pub use results::TallyReport;
pub use scan::{ChunkedScanner, DEFAULT_TARGET_BYTE};
