//! Benchmarks for the AHDSR envelope generator.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};

use canvas_dsp::dsp::ahdsr::Ahdsr;
use canvas_dsp::settings::Settings;

const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn make(settings: &Arc<Settings>) -> Ahdsr {
    Ahdsr::new(
        [1.0, 1.0, 0.7, 0.7, 0.0],
        [40, 20, 60, 127, 40],
        [true, false, false, false, false],
        60,
        Arc::clone(settings),
        0,
        "bench",
    )
}

pub fn bench_ahdsr(c: &mut Criterion) {
    let mut group = c.benchmark_group("voice/ahdsr");
    let settings = Arc::new(Settings::new(32000));

    for &size in BLOCK_SIZES {
        // Attack phase (log shaped).
        let mut env = make(&settings);
        env.start();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, &n| {
            b.iter(|| {
                let mut acc = 0.0;
                for _ in 0..n {
                    acc += env.next();
                }
                black_box(acc)
            })
        });

        // Sustain hold.
        let mut env = make(&settings);
        env.start();
        for _ in 0..200_000 {
            env.next();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, &n| {
            b.iter(|| {
                let mut acc = 0.0;
                for _ in 0..n {
                    acc += env.next();
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}
