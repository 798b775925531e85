//! Benchmarks for ground motion, frame derivation and rendering

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use seismic_response::ground_motion;
use seismic_response::prelude::*;

fn realistic_params() -> SimulationParameters {
    SimulationParameters::new()
        .with_magnitude(7.2)
        .with_distance(15.0)
        .with_soil(SoilType::Soft)
        .with_mode(SimulationMode::Realistic)
}

fn benchmark_realistic_generate(c: &mut Criterion) {
    let params = realistic_params();
    let config = SimulationConfig::default();
    c.bench_function("realistic_generate_1000", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            let history = ground_motion::generate(&params, &config, &mut rng);
            black_box(history);
        })
    });
}

fn benchmark_frame_derivation(c: &mut Criterion) {
    let params = realistic_params();
    let config = SimulationConfig::default().with_floors(40);
    let model = ResponseModel::new(&params, &config);
    let collapse = CollapseState::new();
    let sample = GroundSample {
        t: 12.0,
        pga: 0.4,
        velocity: 20.0,
        displacement: 8.0,
    };
    c.bench_function("derive_frame_40_floors", |b| {
        b.iter(|| {
            let frame = seismic_response::driver::derive_frame_with(
                &model,
                &params,
                &config,
                black_box(&sample),
                12.0,
                &collapse,
            );
            black_box(frame);
        })
    });
}

fn benchmark_render(c: &mut Criterion) {
    let mut driver = AnimationDriver::new(realistic_params(), SimulationConfig::default());
    driver.play();
    for _ in 0..300 {
        driver.tick(1.0 / 60.0);
    }
    c.bench_function("render_recording_canvas", |b| {
        b.iter(|| {
            let mut canvas = RecordingCanvas::new(800.0, 600.0);
            driver.render(&mut canvas).unwrap();
            black_box(canvas.commands().len());
        })
    });
}

fn benchmark_full_run(c: &mut Criterion) {
    c.bench_function("run_to_completion_30fps", |b| {
        b.iter(|| {
            let mut driver = AnimationDriver::new(realistic_params(), SimulationConfig::default());
            black_box(driver.run_to_completion(1.0 / 30.0));
        })
    });
}

criterion_group!(
    benches,
    benchmark_realistic_generate,
    benchmark_frame_derivation,
    benchmark_render,
    benchmark_full_run,
);

criterion_main!(benches);
