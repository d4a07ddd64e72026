//! One-pole reconstruction filter.
//!
//! The PCM ROM stores waveforms at a 32 kHz reference rate. Each sample
//! cursor pushes every consumed ROM value through two of these filters in
//! cascade to smooth the staircase left by nearest-position consumption.
//! The (rate, corner) pair comes from the sample control tables; the ROMs
//! used here configure both stages as `(32000, 15)`.

use std::f64::consts::TAU;

/// Single-pole low-pass filter with per-sample state.
#[derive(Debug, Clone)]
pub struct OnePole {
    alpha: f64,
    state: f64,
}

impl OnePole {
    /// `rate` is the reference sample rate in Hz; `corner_khz` the corner
    /// frequency in kHz, as stored in the control tables.
    pub fn new(rate: u32, corner_khz: u32) -> Self {
        let fc = corner_khz as f64 * 1000.0;
        let alpha = 1.0 - (-TAU * fc / rate as f64).exp();
        Self { alpha, state: 0.0 }
    }

    /// Feed one value through the filter and return the smoothed output.
    #[inline]
    pub fn apply(&mut self, input: f64) -> f64 {
        self.state += self.alpha * (input - self.state);
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
