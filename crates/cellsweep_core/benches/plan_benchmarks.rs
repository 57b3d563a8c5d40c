//! Criterion benchmarks for cellsweep_core planning
//!
//! Run with: cargo bench -p cellsweep_core

use std::fmt::Write;

use cellsweep_core::entities::EntityList;
use cellsweep_core::model::SweepAxis;
use cellsweep_core::{SubmissionContext, SweepBuilder, SweepConfig, SweepPlanner};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn create_stimulus_config(indices: u64) -> SweepConfig {
    SweepBuilder::new("{stim_type}-{stim_idx:03}-{run}.h5")
        .axis(SweepAxis::labels("stim_type", ["ramp", "step", "noise", "chirp16a"]).unwrap())
        .axis(SweepAxis::range("stim_idx", 0..indices).unwrap())
        .samples(10_000, 4)
        .tasks(64)
        .command(["srun", "-n", "{tasks}", "python", "run.py"])
        .args([
            "--outfile",
            "{outfile}",
            "--stim-type",
            "{stim_type}",
            "--stim-idx",
            "{stim_idx}",
            "--num",
            "{num}",
            "--metadata-file",
            "{metadata_file}",
        ])
        .build()
        .unwrap()
}

fn create_cell_config(cells: usize) -> SweepConfig {
    let mut csv = String::new();
    for row in 0..cells {
        writeln!(csv, "cell_{row:05},L5,cADpyr").unwrap();
    }
    let list = EntityList::parse(&csv);

    SweepBuilder::new("{cell}-{stim_type}-{node_id}-{run}.h5")
        .axis(SweepAxis::entities("cell", &list, 0, cells).unwrap())
        .axis(SweepAxis::labels("stim_type", ["chirp16a", "ramp"]).unwrap())
        .partition("cell")
        .shard_by_node()
        .samples(40, 1)
        .tasks(68)
        .args([
            "--outfile",
            "{outfile}",
            "--cori-start",
            "{cell.row}",
            "--cori-end",
            "{cell.row_end}",
            "--num",
            "{num}",
        ])
        .build()
        .unwrap()
}

fn bench_validate(c: &mut Criterion) {
    let config = create_stimulus_config(100);

    c.bench_function("validate_stimulus_sweep", |b| {
        b.iter(|| SweepPlanner::new(black_box(config.clone()), SubmissionContext::new("1")))
    });
}

fn bench_enumerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate");

    for indices in [10, 100, 1000].iter() {
        let planner =
            SweepPlanner::new(create_stimulus_config(*indices), SubmissionContext::new("1"))
                .unwrap();

        group.bench_with_input(BenchmarkId::new("stim_idx", indices), indices, |b, _| {
            b.iter(|| black_box(&planner).jobs().filter_map(Result::ok).count())
        });
    }

    group.finish();
}

fn bench_sharded_vs_full(c: &mut Criterion) {
    let mut group = c.benchmark_group("sharded_comparison");
    let context = SubmissionContext::new("1").with_node(7, 64);
    let planner = SweepPlanner::new(create_cell_config(2048), context).unwrap();

    group.bench_function("all_jobs", |b| {
        b.iter(|| black_box(&planner).all_jobs().filter_map(Result::ok).count())
    });

    group.bench_function("node_shard", |b| {
        b.iter(|| black_box(&planner).jobs().filter_map(Result::ok).count())
    });

    group.bench_function("plan_directories", |b| {
        b.iter(|| black_box(&planner).plan_directories().len())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_validate,
    bench_enumerate,
    bench_sharded_vs_full,
);
criterion_main!(benches);
