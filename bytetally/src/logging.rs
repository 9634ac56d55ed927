//! Logging setup for the launchers.
//!
//! All diagnostics go to stderr through `tracing`; stdout is reserved for
//! the run's results. `RUST_LOG` takes precedence over the configured level:
//!
//! ```bash
//! RUST_LOG=bytetally=debug tally-tasks -f data.bin -t 16 -r 4096
//! ```

use tracing::debug;
use tracing_subscriber::EnvFilter;

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Raises `base` by one level per `-v`, saturating at `trace`
pub fn effective_level(base: &str, verbose: u8) -> &'static str {
    let start = LEVELS
        .iter()
        .position(|l| l.eq_ignore_ascii_case(base))
        .unwrap_or(1);
    LEVELS[(start + verbose as usize).min(LEVELS.len() - 1)]
}

/// Installs the global subscriber. Safe to call more than once; only the
/// first call has an effect.
pub fn init_logging(log_level: &str, verbose: u8) {
    let level = effective_level(log_level, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_names(verbose >= 3)
        .try_init()
        .is_ok();

    if installed {
        debug!("Logging initialised at level {}", level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_level() {
        assert_eq!(effective_level("warn", 0), "warn");
        assert_eq!(effective_level("warn", 1), "info");
        assert_eq!(effective_level("WARN", 2), "debug");
        assert_eq!(effective_level("info", 9), "trace");
        assert_eq!(effective_level("bogus", 0), "warn");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging("error", 0);
        init_logging("trace", 3);
    }
}
