//! Parameter sweeps over both execution models.
//!
//! A sweep runs every combination of model, worker count and read step a fixed
//! number of times against one input and records the wall time of each run.
//! Sweeps are described in YAML:
//!
//! ```yaml
//! models: [distributed, shared-memory]
//! workers: [1, 2, 4, 8]
//! read_steps: [4096, 65536]
//! runs: 3
//! ```
//!
//! Every run of a sweep must report the same grand total; a disagreement is
//! logged and flagged in the summary.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{default_thread_count, ScanPlan};
use crate::engine::{tally, ExecutionModel};
use crate::errors::{TallyError, TallyResult};
use crate::scan::DEFAULT_TARGET_BYTE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_models")]
    pub models: Vec<ExecutionModel>,
    pub workers: Vec<usize>,
    pub read_steps: Vec<usize>,
    #[serde(default = "default_runs")]
    pub runs: usize,
    /// Worker threads for the shared-memory model
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,
    #[serde(default = "default_target_byte")]
    pub target_byte: u8,
}

fn default_models() -> Vec<ExecutionModel> {
    vec![ExecutionModel::Distributed, ExecutionModel::SharedMemory]
}

fn default_runs() -> usize {
    1
}

fn default_target_byte() -> u8 {
    DEFAULT_TARGET_BYTE
}

/// One point of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepInstance {
    pub model: ExecutionModel,
    pub workers: NonZeroUsize,
    pub read_step: NonZeroUsize,
    pub run: usize,
}

/// Measurement of one instance
#[derive(Debug, Clone, Serialize)]
pub struct SweepRecord {
    pub model: ExecutionModel,
    pub workers: usize,
    pub read_step: usize,
    pub run: usize,
    pub grand_total: u64,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub records: Vec<SweepRecord>,
    /// Whether every run agreed on the grand total
    pub consistent: bool,
}

impl SweepConfig {
    /// Reads a sweep description from a YAML file
    pub fn load_from(path: &Path) -> TallyResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| TallyError::file_open(path, e))?;
        let sweep: Self = serde_yaml::from_reader(file)?;
        sweep.validate()?;
        Ok(sweep)
    }

    pub fn validate(&self) -> TallyResult<()> {
        if self.models.is_empty() {
            return Err(TallyError::invalid_configuration("sweep needs at least one model"));
        }
        if self.runs == 0 {
            return Err(TallyError::invalid_configuration("sweep runs must be greater than zero"));
        }
        non_zero_list("workers", &self.workers)?;
        non_zero_list("read_steps", &self.read_steps)?;
        Ok(())
    }

    /// Every instance in execution order: model, then workers, then read
    /// step, then run
    pub fn instances(&self) -> TallyResult<Vec<SweepInstance>> {
        self.validate()?;
        let workers = non_zero_list("workers", &self.workers)?;
        let read_steps = non_zero_list("read_steps", &self.read_steps)?;

        let mut instances = Vec::with_capacity(self.num_jobs());
        for &model in &self.models {
            for &w in &workers {
                for &step in &read_steps {
                    for run in 0..self.runs {
                        instances.push(SweepInstance {
                            model,
                            workers: w,
                            read_step: step,
                            run,
                        });
                    }
                }
            }
        }
        Ok(instances)
    }

    pub fn num_jobs(&self) -> usize {
        self.models.len() * self.workers.len() * self.read_steps.len() * self.runs
    }
}

fn non_zero_list(name: &str, values: &[usize]) -> TallyResult<Vec<NonZeroUsize>> {
    if values.is_empty() {
        return Err(TallyError::invalid_configuration(format!(
            "sweep {} must not be empty",
            name
        )));
    }
    values
        .iter()
        .map(|&v| {
            NonZeroUsize::new(v).ok_or_else(|| {
                TallyError::invalid_configuration(format!("sweep {} must be greater than zero", name))
            })
        })
        .collect()
}

/// Runs the whole sweep against `path`, calling `on_record` after each run
pub fn run_sweep<F>(path: &Path, sweep: &SweepConfig, mut on_record: F) -> TallyResult<SweepSummary>
where
    F: FnMut(&SweepRecord),
{
    let instances = sweep.instances()?;
    info!("Running sweep of {} instances on {}", instances.len(), path.display());

    let mut records = Vec::with_capacity(instances.len());
    for instance in instances {
        let plan = ScanPlan::new(path, instance.workers, instance.read_step)
            .with_target(sweep.target_byte)
            .with_threads(sweep.thread_count);
        let report = tally(&plan, instance.model)?;

        let record = SweepRecord {
            model: instance.model,
            workers: instance.workers.get(),
            read_step: instance.read_step.get(),
            run: instance.run,
            grand_total: report.grand_total(),
            elapsed_ms: report.elapsed.as_secs_f64() * 1000.0,
        };
        on_record(&record);
        records.push(record);
    }

    let consistent = records
        .windows(2)
        .all(|pair| pair[0].grand_total == pair[1].grand_total);
    if !consistent {
        warn!("Sweep runs disagree on the grand total");
    }
    Ok(SweepSummary {
        records,
        consistent,
    })
}
