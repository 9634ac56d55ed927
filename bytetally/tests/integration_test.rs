use anyhow::Result;
use bytetally::generate::{generate_input, GenerateOptions};
use bytetally::{partition, tally, ByteRange, ExecutionModel, ScanPlan, TallyConfig, TallyError};
use std::fs::File;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use tempfile::tempdir;

const MODELS: [ExecutionModel; 2] = [ExecutionModel::Distributed, ExecutionModel::SharedMemory];

fn nz(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    Ok(())
}

/// 100 bytes with exactly seven 5s at known offsets
fn seven_fives() -> Vec<u8> {
    let mut data = vec![0u8; 100];
    for offset in [0, 13, 24, 25, 50, 77, 99] {
        data[offset] = 5;
    }
    // Near misses
    data[1] = 4;
    data[2] = 6;
    data[60] = 0x55;
    data
}

#[test]
fn test_hundred_bytes_seven_fives() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("scenario1.bin");
    write_file(&path, &seven_fives())?;

    for model in MODELS {
        let report = tally(&ScanPlan::new(&path, nz(4), nz(16)), model)?;
        assert_eq!(report.grand_total(), 7, "{}", model);
        assert_eq!(report.file_size, 100);
        assert_eq!(report.chunk_size, 25);
    }

    // Independent of N and read step
    for model in MODELS {
        for workers in [1, 2, 3, 7, 100, 150] {
            for read_step in [1, 3, 16, 99, 100, 1000] {
                let report = tally(&ScanPlan::new(&path, nz(workers), nz(read_step)), model)?;
                assert_eq!(
                    report.grand_total(),
                    7,
                    "{} with {} workers, read step {}",
                    model,
                    workers,
                    read_step
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_empty_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("empty.bin");
    write_file(&path, &[])?;

    for model in MODELS {
        for workers in [1, 4, 32] {
            let report = tally(&ScanPlan::new(&path, nz(workers), nz(16)), model)?;
            assert_eq!(report.grand_total(), 0);
            assert_eq!(report.file_size, 0);
            assert_eq!(report.totals.read_calls, 0);
            assert_eq!(report.totals.bytes_read, 0);
            assert_eq!(report.workers(), workers);
            assert!(report.ranges.iter().all(ByteRange::is_empty));
        }
    }
    Ok(())
}

#[test]
fn test_ten_bytes_three_workers() -> Result<()> {
    let expected = vec![
        ByteRange::new(0, 3),
        ByteRange::new(3, 6),
        ByteRange::new(6, 10),
    ];
    assert_eq!(partition(10, 3)?, expected);

    let dir = tempdir()?;
    let path = dir.path().join("ten.bin");
    write_file(&path, &[5, 0, 0, 5, 0, 0, 5, 5, 5, 5])?;

    for model in MODELS {
        let report = tally(&ScanPlan::new(&path, nz(3), nz(2)), model)?;
        assert_eq!(report.ranges, expected);
        assert_eq!(report.chunk_size, 3);
        assert_eq!(report.grand_total(), 6);
        // Two reads for each 3-byte range, two for the 4-byte range
        assert_eq!(report.totals.read_calls, 6);
    }
    Ok(())
}

#[test]
fn test_generated_input_round_trip() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("random_numbers.bin");
    let summary = generate_input(
        &path,
        &GenerateOptions {
            count: 250_000,
            seed: Some(2024),
            ..GenerateOptions::default()
        },
    )?;

    for model in MODELS {
        let plan = ScanPlan::new(&path, nz(16), nz(4096)).with_threads(nz(4));
        let report = tally(&plan, model)?;
        assert_eq!(report.grand_total(), summary.target_occurrences);
        assert_eq!(report.totals.bytes_read, summary.bytes);
    }
    Ok(())
}

#[test]
fn test_configuration_errors_precede_io() {
    // The file does not exist, but validation must fail first
    let config = TallyConfig {
        path: Some("/no/such/file.bin".into()),
        workers: Some(0),
        read_step: Some(16),
        ..TallyConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(TallyError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_missing_file_in_both_models() {
    let dir = tempdir().unwrap();
    let plan = ScanPlan::new(dir.path().join("missing.bin"), nz(2), nz(8));
    for model in MODELS {
        match tally(&plan, model) {
            Err(TallyError::FileOpen { path, .. }) => assert!(path.ends_with("missing.bin")),
            other => panic!("expected FileOpen, got {:?}", other),
        }
    }
}
