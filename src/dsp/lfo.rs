//! Low-frequency oscillators and their lock-free publish cells.
//!
//! Each part runs two free-running sine LFOs: the first feeds vibrato (and
//! the filter's wah input), the second feeds tremolo. The engine advances
//! them once per output frame and publishes the current values into
//! [`LfoPair`] cells; every voice on the part reads the same pair, so all
//! partials of a chord wobble together.
//!
//! The cells are single words written with `Release` and read with
//! `Acquire`, the same discipline the settings store uses. A voice can
//! never observe a torn value.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU32, Ordering};

/// Phase-accumulator sine oscillator at control rate.
pub struct Lfo {
    phase: f32,
    inc: f32,
}

impl Lfo {
    pub fn new(rate_hz: f32, sample_rate: u32) -> Self {
        Self {
            phase: 0.0,
            inc: TAU * rate_hz / sample_rate as f32,
        }
    }

    /// Advance one sample and return the bipolar output in [-1, 1].
    #[inline]
    pub fn tick(&mut self) -> f32 {
        let value = self.phase.sin();
        self.phase += self.inc;
        if self.phase > TAU {
            self.phase -= TAU;
        }
        value
    }
}

/// The two published LFO values a part's voices modulate from.
#[derive(Debug, Default)]
pub struct LfoPair {
    cells: [AtomicU32; 2],
}

impl LfoPair {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a fresh value (engine side, once per frame).
    #[inline]
    pub fn publish(&self, which: usize, value: f32) {
        self.cells[which].store(value.to_bits(), Ordering::Release);
    }

    /// Read the latest published value (voice side).
    #[inline]
    pub fn value(&self, which: usize) -> f32 {
        f32::from_bits(self.cells[which].load(Ordering::Acquire))
    }
}
