//! Per-voice synthesis core for a Sound Canvas style ROMpler.
//!
//! The crate turns note-on events plus immutable ROM-derived control and PCM
//! tables into a stereo stream of floating-point frames. It is organised
//! leaves-first:
//!
//! - [`dsp`] holds the allocation-free primitives: the AHDSR envelope
//!   generator, the fractional sample cursor with its loop topologies, the
//!   one-pole reconstruction filters and the low-frequency oscillators.
//! - [`rom`] defines the immutable control-table and PCM-sample records the
//!   ROM loader hands in before audio starts.
//! - [`settings`] is the word-sized atomic parameter store shared between
//!   the control thread and the audio thread.
//! - [`synth`] composes the above into partials (single playback streams),
//!   notes (up to two partials) and the polyphonic engine that mixes them.
//! - [`io`] carries decoded MIDI events to the engine's message queue.
//!
//! Everything on the audio path is wait-free and allocation-free in steady
//! state: per-sample work is pure arithmetic over a fixed state footprint.

pub mod dsp;
pub mod error;
pub mod io;
pub mod rom;
pub mod settings;
pub mod synth;

pub use error::VoiceError;
pub use synth::poly::CanvasEngine;

/// Largest number of frames the engine renders in one `render_block` call.
pub const MAX_BLOCK_SIZE: usize = 4096;
