//! Benchmarks for the PCM sample cursor.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};

use canvas_dsp::dsp::cursor::SampleCursor;
use canvas_dsp::rom::{LoopMode, SampleDef};

const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn meta(mode: LoopMode) -> SampleDef {
    SampleDef {
        sample_len: 4000,
        loop_len: 1000,
        loop_mode: mode,
        root_key: 60,
        pitch: 1024,
        volume: 0x7f,
        fine_volume: 1024,
    }
}

pub fn bench_cursor(c: &mut Criterion) {
    let mut group = c.benchmark_group("voice/cursor");
    let pcm: Vec<f32> = (0..4000).map(|i| (i as f32 * 0.01).sin()).collect();

    for &size in BLOCK_SIZES {
        for (name, mode) in [
            ("forward_loop", LoopMode::Forward),
            ("ping_pong", LoopMode::PingPong),
        ] {
            let meta = meta(mode);
            let mut cursor = SampleCursor::new();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &n| {
                b.iter(|| {
                    let mut acc = 0.0;
                    for _ in 0..n {
                        acc += cursor.advance(black_box(1.003), &pcm, &meta).unwrap_or(0.0);
                    }
                    black_box(acc)
                })
            });
        }
    }

    group.finish();
}
