//! Benchmark for a complete voice rendering stereo frames.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};

use canvas_dsp::dsp::lfo::LfoPair;
use canvas_dsp::rom::{
    ControlRom, EnvSpec, InstPartial, Instrument, LoopMode, PartialDef, PcmRom, PcmSample,
    SampleDef, SynthGen, UNUSED,
};
use canvas_dsp::settings::Settings;
use canvas_dsp::synth::Partial;

const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn rom() -> (Arc<ControlRom>, Arc<PcmRom>) {
    let used = InstPartial {
        partial_index: 0,
        coarse_pitch: 0x40,
        fine_pitch: 0x40,
        pitch_key_flw: 0x4a,
        volume: 0x7f,
        panpot: 0x40,
        cutoff: 0x60,
        pitch_lfo_depth: 10,
        tvf_lfo_depth: 0,
        tva_lfo_depth: 8,
        pitch_env: EnvSpec::flat(),
        tvf_env: EnvSpec::flat(),
        tva_env: EnvSpec {
            init: 0x40,
            value: [0x7f, 0x7f, 0x70, 0x70, 0],
            time: [10, 5, 40, 127, 30],
        },
    };
    let unused = InstPartial {
        partial_index: UNUSED,
        ..used
    };
    let ctrl = ControlRom::new(
        vec![Instrument {
            partials: [used, unused],
        }],
        vec![PartialDef {
            breaks: [0x7f; 16],
            samples: [0; 16],
        }],
        vec![SampleDef {
            sample_len: 4000,
            loop_len: 1000,
            loop_mode: LoopMode::Forward,
            root_key: 60,
            pitch: 1024,
            volume: 0x7f,
            fine_volume: 1024,
        }],
        SynthGen::Sc55Mk2,
    );
    let pcm = PcmRom::new(vec![PcmSample {
        data: (0..4000).map(|i| (i as f32 * 0.01).sin()).collect(),
    }]);
    (Arc::new(ctrl), Arc::new(pcm))
}

pub fn bench_partial(c: &mut Criterion) {
    let mut group = c.benchmark_group("voice/partial");
    let (ctrl, pcm) = rom();
    let settings = Arc::new(Settings::new(32000));
    let lfos = Arc::new(LfoPair::new());

    for &size in BLOCK_SIZES {
        let mut partial = Partial::new(
            60,
            0,
            0,
            &ctrl,
            Arc::clone(&pcm),
            Arc::clone(&lfos),
            Arc::clone(&settings),
            0,
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("stereo_frames", size), &size, |b, &n| {
            b.iter(|| {
                let mut frame = [0.0f32; 2];
                for _ in 0..n {
                    frame = [0.0; 2];
                    partial.next_sample(&mut frame);
                }
                black_box(frame)
            })
        });
    }

    group.finish();
}
