use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{TallyError, TallyResult};
use crate::scan::{ChunkedScanner, DEFAULT_TARGET_BYTE};

/// Configuration for a tally run.
///
/// # Configuration Locations
///
/// Values are layered, later sources overriding earlier ones:
/// 1. Global `$HOME/.config/bytetally/config.yaml`
/// 2. Local `.bytetally.yaml` in the current directory
/// 3. A file given with `--config`
/// 4. `BYTETALLY_*` environment variables (e.g. `BYTETALLY_WORKERS=8`)
///
/// Command-line values are merged on top with [`TallyConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # Input file
/// path: "random_numbers.bin"
///
/// # Ranks (tally-ranks) or tasks (tally-tasks)
/// workers: 16
///
/// # Maximum bytes per read call
/// read_step: 65536
///
/// # Byte value to count
/// target_byte: 5
///
/// # Worker threads for the shared-memory model (default: CPU cores)
/// thread_count: 8
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
///
/// The path, worker count and read step have no defaults; a run is only
/// planned once [`TallyConfig::validate`] has confirmed all three.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyConfig {
    /// File to scan
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Number of ranges the file is split into
    #[serde(default)]
    pub workers: Option<usize>,

    /// Maximum number of bytes requested per read
    #[serde(default)]
    pub read_step: Option<usize>,

    /// Byte value whose occurrences are counted
    #[serde(default = "default_target_byte")]
    pub target_byte: u8,

    /// Threads in the shared-memory worker pool
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_target_byte() -> u8 {
    DEFAULT_TARGET_BYTE
}

pub(crate) fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            path: None,
            workers: None,
            read_step: None,
            target_byte: default_target_byte(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

impl TallyConfig {
    /// Loads configuration from the default locations
    pub fn load() -> TallyResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration, including a specific file if given
    pub fn load_from(config_path: Option<&Path>) -> TallyResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("bytetally/config.yaml")),
            Some(PathBuf::from(".bytetally.yaml")),
        ];
        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("BYTETALLY").try_parsing(true));

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments over configuration file values
    pub fn merge_with_cli(mut self, cli_config: TallyConfig) -> Self {
        if cli_config.path.is_some() {
            self.path = cli_config.path;
        }
        if cli_config.workers.is_some() {
            self.workers = cli_config.workers;
        }
        if cli_config.read_step.is_some() {
            self.read_step = cli_config.read_step;
        }
        if cli_config.target_byte != default_target_byte() {
            self.target_byte = cli_config.target_byte;
        }
        if cli_config.thread_count != default_thread_count() {
            self.thread_count = cli_config.thread_count;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// Fills a missing worker count with one worker per CPU, the way a
    /// launcher sizes its world when nobody asked for a specific size
    pub fn or_default_workers(mut self) -> Self {
        if self.workers.is_none() {
            self.workers = Some(default_thread_count().get());
        }
        self
    }

    /// Checks the mandatory parameters without touching the file system
    pub fn validate(&self) -> TallyResult<ScanPlan> {
        let path = self
            .path
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| TallyError::invalid_configuration("input file is required"))?;
        let workers = positive("worker count", self.workers)?;
        let read_step = positive("read step", self.read_step)?;

        Ok(ScanPlan {
            path,
            workers,
            read_step,
            target: self.target_byte,
            threads: self.thread_count,
        })
    }
}

fn positive(name: &str, value: Option<usize>) -> TallyResult<NonZeroUsize> {
    match value {
        None => Err(TallyError::invalid_configuration(format!(
            "{} is required",
            name
        ))),
        Some(v) => NonZeroUsize::new(v).ok_or_else(|| {
            TallyError::invalid_configuration(format!("{} must be greater than zero", name))
        }),
    }
}

/// A validated run: every mandatory parameter present and non-zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    pub path: PathBuf,
    pub workers: NonZeroUsize,
    pub read_step: NonZeroUsize,
    pub target: u8,
    pub threads: NonZeroUsize,
}

impl ScanPlan {
    /// Plan with the default target byte and one thread per CPU
    pub fn new(path: impl Into<PathBuf>, workers: NonZeroUsize, read_step: NonZeroUsize) -> Self {
        Self {
            path: path.into(),
            workers,
            read_step,
            target: DEFAULT_TARGET_BYTE,
            threads: default_thread_count(),
        }
    }

    pub fn with_target(mut self, target: u8) -> Self {
        self.target = target;
        self
    }

    pub fn with_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = threads;
        self
    }

    pub fn scanner(&self) -> ChunkedScanner {
        ChunkedScanner::new(self.target, self.read_step)
    }
}
