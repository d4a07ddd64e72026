//! Error types for voice construction.
//!
//! Construction is the only fallible entry point in the crate. Once a voice
//! exists, every per-sample path either produces a frame or reports itself
//! terminated; nothing on the audio thread returns `Result`.

use thiserror::Error;

/// Errors that can occur while building a voice from the control tables.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VoiceError {
    /// The instrument index does not exist in the control ROM.
    #[error("instrument {index} out of range")]
    BadInstrument { index: u16 },

    /// The requested partial slot carries the unused marker (0xffff).
    #[error("instrument {instrument} has no partial in slot {slot}")]
    EmptyPartial { instrument: u16, slot: usize },

    /// The break table resolved to the reserved sample index 0xffff, or no
    /// break entry covered the shifted key at all.
    #[error("no playable sample for key {key} in partial {partial}")]
    NoSampleForKey { key: u8, partial: u16 },
}
