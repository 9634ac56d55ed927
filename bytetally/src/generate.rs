//! Synthetic input files.
//!
//! Inputs are a stream of 4-byte little-endian integers drawn uniformly from
//! `0..=max_value`. With the default `max_value` of 10 only the low byte of
//! each integer is ever non-zero, so the number of `5` bytes in the file is the
//! number of integers equal to 5.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{TallyError, TallyResult};
use crate::scan::{count_byte, DEFAULT_TARGET_BYTE};

const WRITE_BUFFER_CAPACITY: usize = 1 << 20;

/// Parameters of a generated input
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Number of integers to write
    pub count: u64,
    /// Inclusive upper bound of the random values
    pub max_value: u32,
    /// Seed for reproducible files; `None` draws from the OS
    pub seed: Option<u64>,
    /// Byte whose occurrences are reported in the summary
    pub target: u8,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            count: 0,
            max_value: 10,
            seed: None,
            target: DEFAULT_TARGET_BYTE,
        }
    }
}

/// What was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerateSummary {
    pub integers: u64,
    pub bytes: u64,
    /// Bytes equal to the target, i.e. the grand total a tally must report
    pub target_occurrences: u64,
}

/// Writes a random input file to `path`, replacing any existing file
pub fn generate_input(path: &Path, options: &GenerateOptions) -> TallyResult<GenerateSummary> {
    let bytes = options.count.checked_mul(4).ok_or_else(|| {
        TallyError::invalid_configuration(format!(
            "{} integers do not fit in a file",
            options.count
        ))
    })?;
    let file = File::create(path).map_err(|e| TallyError::file_open(path, e))?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_CAPACITY, file);
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut target_occurrences = 0;
    for i in 0..options.count {
        let value: u32 = rng.random_range(0..=options.max_value);
        let bytes = value.to_le_bytes();
        target_occurrences += count_byte(options.target, &bytes);
        writer.write_all(&bytes)?;

        if i > 0 && i % (1 << 24) == 0 {
            debug!("Generated {} of {} integers", i, options.count);
        }
    }
    writer.flush()?;

    let summary = GenerateSummary {
        integers: options.count,
        bytes,
        target_occurrences,
    };
    info!(
        "Generated {} random integers in {} ({:.2} MB)",
        summary.integers,
        path.display(),
        summary.bytes as f64 / (1024.0 * 1024.0)
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generated_file_matches_summary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.bin");
        let options = GenerateOptions {
            count: 10_000,
            seed: Some(7),
            ..GenerateOptions::default()
        };

        let summary = generate_input(&path, &options).unwrap();
        let data = std::fs::read(&path).unwrap();
        assert_eq!(summary.bytes, 40_000);
        assert_eq!(data.len(), 40_000);
        assert_eq!(summary.target_occurrences, count_byte(5, &data));

        let fives = data
            .chunks_exact(4)
            .filter(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]) == 5)
            .count() as u64;
        assert_eq!(fives, summary.target_occurrences);
        assert!(data.chunks_exact(4).all(|c| c[0] <= 10 && c[1..] == [0, 0, 0]));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let dir = tempdir().unwrap();
        let options = GenerateOptions {
            count: 256,
            seed: Some(42),
            ..GenerateOptions::default()
        };
        generate_input(&dir.path().join("a.bin"), &options).unwrap();
        generate_input(&dir.path().join("b.bin"), &options).unwrap();
        assert_eq!(
            std::fs::read(dir.path().join("a.bin")).unwrap(),
            std::fs::read(dir.path().join("b.bin")).unwrap()
        );
    }

    #[test]
    fn test_zero_count_writes_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        let summary = generate_input(&path, &GenerateOptions::default()).unwrap();
        assert_eq!(summary.target_occurrences, 0);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_oversized_count_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("huge.bin");
        let options = GenerateOptions {
            count: u64::MAX / 2,
            ..GenerateOptions::default()
        };
        let err = generate_input(&path, &options).unwrap_err();
        assert!(err.is_configuration());
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("input.bin");
        let err = generate_input(&path, &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, TallyError::FileOpen { .. }));
    }
}
