//! Error types for bytetally.
//!
//! Every fallible operation returns a [`TallyResult`]. The variants follow the
//! lifecycle of a run:
//!
//! 1. **Configuration** - missing, zero or malformed parameters are rejected
//!    before the input file is touched
//! 2. **Open** - the input file could not be opened or measured
//! 3. **Scan** - a worker hit an I/O fault or an unexpected end of file inside
//!    its range
//! 4. **Aggregation** - a worker failed and the run was abandoned
//!
//! ```text
//! match tally(&plan, ExecutionModel::SharedMemory) {
//!     Ok(report) => println!("{}", report.grand_total()),
//!     Err(TallyError::WorkerFailed { worker, range, .. }) => // report which worker,
//!     Err(e) => // any other fatal error
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::partition::ByteRange;

/// Result type for tally operations
pub type TallyResult<T> = Result<T, TallyError>;

/// Errors that can occur while planning, scanning or aggregating
#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unexpected end of file at offset {offset} while scanning {range}")]
    UnexpectedEof { offset: u64, range: ByteRange },
    #[error("Worker {worker} failed on range {range}: {reason}")]
    WorkerFailed {
        worker: usize,
        range: ByteRange,
        reason: String,
    },
    #[error("Communicator error: {0}")]
    Communicator(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TallyError {
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn file_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            source,
        }
    }

    pub fn unexpected_eof(offset: u64, range: ByteRange) -> Self {
        Self::UnexpectedEof { offset, range }
    }

    pub fn worker_failed(worker: usize, range: ByteRange, reason: impl Into<String>) -> Self {
        Self::WorkerFailed {
            worker,
            range,
            reason: reason.into(),
        }
    }

    pub fn communicator(msg: impl Into<String>) -> Self {
        Self::Communicator(msg.into())
    }

    /// True for errors raised before any file I/O was attempted
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}

impl From<config::ConfigError> for TallyError {
    fn from(err: config::ConfigError) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}

impl From<serde_yaml::Error> for TallyError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}
