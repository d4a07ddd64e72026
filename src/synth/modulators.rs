//! Time-variant modulators: pitch (TVP), filter (TVF) and amplitude (TVA).
//!
//! Each modulator is an AHDSR envelope plus one of the part's shared LFOs.
//! The pitch and filter envelopes start from an explicit initial value and
//! run linear phases; the amplitude envelope starts from silence, honours
//! the ROM shape flags and scales its phase times with the key.

use std::sync::Arc;

use crate::dsp::ahdsr::Ahdsr;
use crate::dsp::lfo::LfoPair;
use crate::rom::InstPartial;
use crate::settings::{PartId, Settings};

const CENT: f64 = std::f64::consts::LN_2 / 1200.0;

/// Map a 7-bit envelope table value to a signed offset in cents.
fn env_cents(v: u8) -> f64 {
    (v as f64 - 0x40 as f64) * 10.0
}

/// Vibrato plus pitch envelope. `pitch` yields a frequency ratio folded
/// into the per-sample pitch composition.
#[derive(Debug)]
pub struct Tvp {
    env: Ahdsr,
    lfos: Arc<LfoPair>,
    depth_cents: f64,
}

impl Tvp {
    pub fn new(
        inst: &InstPartial,
        lfos: Arc<LfoPair>,
        settings: Arc<Settings>,
        part: PartId,
    ) -> Self {
        let spec = &inst.pitch_env;
        let mut env = Ahdsr::with_init(
            env_cents(spec.init),
            spec.value.map(env_cents),
            spec.time,
            settings,
            part,
            "TVP",
        );
        env.start();

        Self {
            env,
            lfos,
            depth_cents: inst.pitch_lfo_depth as f64,
        }
    }

    /// Advance one sample and return the pitch ratio.
    pub fn pitch(&mut self) -> f64 {
        let env = self.env.next();
        let vibrato = self.lfos.value(0) as f64 * self.depth_cents;
        ((env + vibrato) * CENT).exp()
    }

    pub fn note_off(&mut self) {
        self.env.release();
    }
}

/// Wah plus filter envelope.
///
/// The filter stage itself is currently not applied in the sample path;
/// the modulator still exists so note-off routing and the envelope state
/// stay consistent with the other two.
#[derive(Debug)]
pub struct Tvf {
    env: Ahdsr,
    lfos: Arc<LfoPair>,
    depth_cents: f64,
    base_hz: f64,
    sample_rate: f64,
    state: f64,
}

impl Tvf {
    pub fn new(
        inst: &InstPartial,
        lfos: Arc<LfoPair>,
        settings: Arc<Settings>,
        part: PartId,
    ) -> Self {
        let spec = &inst.tvf_env;
        let sample_rate = settings.sample_rate() as f64;
        let mut env = Ahdsr::with_init(
            env_cents(spec.init),
            spec.value.map(env_cents),
            spec.time,
            settings,
            part,
            "TVF",
        );
        env.start();

        Self {
            env,
            lfos,
            depth_cents: inst.tvf_lfo_depth as f64,
            // 7-bit cutoff index, one semitone per step up from 20 Hz.
            base_hz: 20.0 * 2.0_f64.powf(inst.cutoff as f64 / 12.0),
            sample_rate,
            state: 0.0,
        }
    }

    /// One-pole low-pass at the envelope-modulated cutoff.
    pub fn apply(&mut self, sample: f64) -> f64 {
        let cents = self.env.next() + self.lfos.value(0) as f64 * self.depth_cents;
        let cutoff = self.base_hz * (cents * CENT).exp();
        let alpha = 1.0 - (-std::f64::consts::TAU * cutoff / self.sample_rate).exp();
        self.state += alpha * (sample - self.state);
        self.state
    }

    pub fn note_off(&mut self) {
        self.env.release();
    }
}

/// Tremolo plus amplitude envelope. The amplitude envelope is the one that
/// decides when the partial is done sounding.
#[derive(Debug)]
pub struct Tva {
    env: Ahdsr,
    lfos: Arc<LfoPair>,
    depth: f64,
}

impl Tva {
    pub fn new(
        inst: &InstPartial,
        key: u8,
        lfos: Arc<LfoPair>,
        settings: Arc<Settings>,
        part: PartId,
    ) -> Self {
        let spec = &inst.tva_env;
        let value = spec.value.map(|v| v as f64 / 127.0);
        // Concave attack, linear everywhere else.
        let shape = [true, false, false, false, false];
        let mut env = Ahdsr::new(value, spec.time, shape, key, settings, part, "TVA");
        env.start();

        Self {
            env,
            lfos,
            depth: inst.tva_lfo_depth as f64 / 127.0,
        }
    }

    /// Advance one sample and return the gain factor.
    pub fn amplification(&mut self) -> f64 {
        let env = self.env.next();
        let tremolo = 1.0 + self.lfos.value(1) as f64 * self.depth;
        (env * tremolo).max(0.0)
    }

    pub fn finished(&self) -> bool {
        self.env.finished()
    }

    pub fn note_off(&mut self) {
        self.env.release();
    }
}
