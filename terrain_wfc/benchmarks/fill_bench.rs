use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use terrain_wfc::{CollapseEngine, NullSink, RuleSet, RunOptions, SeededPicker};

fn bench_fill(c: &mut Criterion) {
    let compiled = RuleSet::builtin()
        .compile()
        .expect("builtin rules compile");
    let mut group = c.benchmark_group("fill");

    for (width, height) in [(16u32, 8u32), (32, 16), (60, 15), (64, 64)] {
        let id = BenchmarkId::new("grid", format!("{width}x{height}"));
        group.bench_with_input(id, &(width, height), |b, &(width, height)| {
            let mut seed = 0u64;
            b.iter_batched(
                || {
                    seed += 1;
                    CollapseEngine::new(
                        compiled.catalog.clone(),
                        compiled.adjacency.clone(),
                        width,
                        height,
                        SeededPicker::from_seed(seed),
                        RunOptions::default(),
                    )
                    .expect("engine builds")
                },
                |mut engine| engine.run(&mut NullSink),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(fill_benches, bench_fill);
criterion_main!(fill_benches);
