use bytetally::generate::{generate_input, GenerateOptions};
use bytetally::{tally, ExecutionModel, ScanPlan};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::num::NonZeroUsize;
use tempfile::tempdir;

fn nz(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn bench_read_step(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("input.bin");
    generate_input(
        &path,
        &GenerateOptions {
            count: 1 << 20,
            seed: Some(1),
            ..GenerateOptions::default()
        },
    )
    .unwrap();

    let mut group = c.benchmark_group("Read Step");
    for read_step in [512, 4096, 65536, 1 << 20] {
        for model in [ExecutionModel::Distributed, ExecutionModel::SharedMemory] {
            let plan = ScanPlan::new(&path, nz(8), nz(read_step));
            group.bench_with_input(
                BenchmarkId::new(model.to_string(), read_step),
                &plan,
                |b, plan| b.iter(|| black_box(tally(plan, model).unwrap())),
            );
        }
    }
    group.finish();
}

fn bench_worker_scaling(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("input.bin");
    generate_input(
        &path,
        &GenerateOptions {
            count: 1 << 20,
            seed: Some(2),
            ..GenerateOptions::default()
        },
    )
    .unwrap();

    let mut group = c.benchmark_group("Worker Scaling");
    for workers in [1, 2, 4, 8, 16, 64] {
        for model in [ExecutionModel::Distributed, ExecutionModel::SharedMemory] {
            let plan = ScanPlan::new(&path, nz(workers), nz(65536));
            group.bench_with_input(
                BenchmarkId::new(model.to_string(), workers),
                &plan,
                |b, plan| b.iter(|| black_box(tally(plan, model).unwrap())),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_read_step, bench_worker_scaling);
criterion_main!(benches);
