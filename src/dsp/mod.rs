//! Low-level DSP primitives used by the voice layer.
//!
//! These components are allocation-free and realtime-safe, making them safe
//! to embed directly inside voice structs. They intentionally stay focused
//! on the signal-processing math so the partial layer can handle parameter
//! composition and lifetime.

/// Five-phase envelope generator (attack, hold, decay, sustain, release).
pub mod ahdsr;
/// Fractional PCM read position with loop topology handling.
pub mod cursor;
/// Low-frequency oscillators and their shared publish cells.
pub mod lfo;
/// One-pole reconstruction low-pass filter.
pub mod one_pole;

pub use ahdsr::{Ahdsr, Phase};
pub use cursor::{Direction, SampleCursor};
