//! Benchmarks for the neural CA update evaluator.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use neural_ca::{Engine, EngineConfig, SeedPattern};

fn bench_step_grid_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_step");

    for size in [64, 128, 256, 512] {
        let config = EngineConfig {
            grid_size: size,
            num_channels: 2,
            ..Default::default()
        };

        let mut engine = Engine::with_rng(config, 42).unwrap();
        engine.seed(size / 2, size / 2, 10.0, SeedPattern::Center);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| {
                    black_box(&mut engine).step();
                });
            },
        );
    }

    group.finish();
}

fn bench_multichannel(c: &mut Criterion) {
    let mut group = c.benchmark_group("multichannel");

    for channels in [1, 2, 4] {
        let config = EngineConfig {
            grid_size: 128,
            num_channels: channels,
            ..Default::default()
        };

        let mut engine = Engine::with_rng(config, 42).unwrap();
        engine.seed(64, 64, 10.0, SeedPattern::Random);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_channels", channels)),
            &channels,
            |b, _| {
                b.iter(|| {
                    black_box(&mut engine).step();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_step_grid_size, bench_multichannel);
criterion_main!(benches);
