use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use negation_grid::core::config::GridConfig;
use negation_grid::core::types::SweepMode;
use negation_grid::simulation::FieldWorld;

fn tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for size in [64usize, 256] {
        for mode in [SweepMode::InPlace, SweepMode::Snapshot] {
            let config = GridConfig {
                sweep_mode: mode,
                ..Default::default()
            };
            let mut world = FieldWorld::new(size, size, config).expect("valid grid");
            // Let the front spread so the passes have real work
            world.run(50);

            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", mode), size),
                &size,
                |b, _| b.iter(|| black_box(world.tick())),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, tick_benchmark);
criterion_main!(benches);
