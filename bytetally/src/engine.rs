use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::ScanPlan;
use crate::errors::{TallyError, TallyResult};
use crate::results::TallyReport;
use crate::{ranks, tasks};

/// The two ways of spreading ranges over workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionModel {
    /// Isolated ranks, static assignment, combined by a collective reduction
    Distributed,
    /// Tasks on a thread pool, dynamic assignment, combined by atomic adds
    SharedMemory,
}

impl fmt::Display for ExecutionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distributed => write!(f, "distributed"),
            Self::SharedMemory => write!(f, "shared-memory"),
        }
    }
}

impl FromStr for ExecutionModel {
    type Err = TallyError;

    fn from_str(s: &str) -> TallyResult<Self> {
        match s.to_lowercase().as_str() {
            "distributed" | "ranks" | "mpi" => Ok(Self::Distributed),
            "shared-memory" | "shared" | "tasks" | "omp" => Ok(Self::SharedMemory),
            other => Err(TallyError::invalid_configuration(format!(
                "unknown execution model '{}'",
                other
            ))),
        }
    }
}

/// Opens the input and measures it. The handle is returned so the caller
/// decides how long it lives.
pub(crate) fn open_input(path: &Path) -> TallyResult<(File, u64)> {
    let file = File::open(path).map_err(|e| TallyError::file_open(path, e))?;
    let file_size = file.metadata()?.len();
    debug!("Opened {} ({} bytes)", path.display(), file_size);
    Ok((file, file_size))
}

/// Counts the target byte in `plan.path` using the requested model
pub fn tally(plan: &ScanPlan, model: ExecutionModel) -> TallyResult<TallyReport> {
    info!("Starting {} tally of {}", model, plan.path.display());

    let report = match model {
        ExecutionModel::Distributed => ranks::run(plan)?,
        ExecutionModel::SharedMemory => tasks::run(plan)?,
    };

    info!(
        "Tally complete. Found {} occurrences of {} in {}",
        report.grand_total(),
        report.target,
        humantime::format_duration(report.elapsed)
    );
    Ok(report)
}
