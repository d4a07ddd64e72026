//! Immutable control and PCM tables decoded from a ROM set.
//!
//! ROM loading and parsing live outside this crate; a loader populates
//! these records once, wraps them in `Arc`, and hands them to the engine
//! before audio starts. Nothing here is mutated afterwards, so voices on
//! the audio thread share them without synchronisation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reserved index marking an empty partial slot or a missing sample.
pub const UNUSED: u16 = 0xffff;

/// ROM generation. Later generations change a handful of routing rules,
/// e.g. whether part key shift applies to drum parts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SynthGen {
    Sc55,
    Sc55Mk2,
    Sc88,
    Sc88Pro,
}

/// Loop topology of a PCM sample's sustain segment.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Forward-only playback that jumps back over the loop region.
    Forward,
    /// Forward-backward playback, reflecting at both loop ends.
    PingPong,
    /// Forward playback that ends the partial at the sample end.
    OneShot,
}

/// Phase tables for one envelope as stored in the instrument definition.
///
/// `init` is the starting value for pitch and filter envelopes (centre
/// 0x40); amplitude envelopes always start from silence and ignore it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvSpec {
    pub init: u8,
    pub value: [u8; 5],
    pub time: [u8; 5],
}

impl EnvSpec {
    /// A flat envelope resting at the centre value.
    pub fn flat() -> Self {
        Self {
            init: 0x40,
            value: [0x40; 5],
            time: [0; 5],
        }
    }
}

/// One of the up to two partial definitions inside an instrument record.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstPartial {
    /// Index into the break-table records, or [`UNUSED`] for an empty slot.
    pub partial_index: u16,
    /// Coarse pitch offset in semitones, centre 0x40.
    pub coarse_pitch: u8,
    /// Fine pitch offset in cents, centre 0x40.
    pub fine_pitch: u8,
    /// Pitch key follow; 0x4a tracks the keyboard 1:1.
    pub pitch_key_flw: u8,
    /// Partial volume, 0..=0x7f.
    pub volume: u8,
    /// Stereo position, centre 0x40.
    pub panpot: u8,
    /// Filter cutoff index, 0..=0x7f.
    pub cutoff: u8,
    /// Vibrato depth applied from the part's first LFO, in cents per unit.
    pub pitch_lfo_depth: u8,
    /// Wah depth applied from the part's first LFO.
    pub tvf_lfo_depth: u8,
    /// Tremolo depth applied from the part's second LFO.
    pub tva_lfo_depth: u8,
    pub pitch_env: EnvSpec,
    pub tvf_env: EnvSpec,
    pub tva_env: EnvSpec,
}

impl InstPartial {
    pub fn is_used(&self) -> bool {
        self.partial_index != UNUSED
    }
}

/// Instrument record: up to two partials layered per note.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument {
    pub partials: [InstPartial; 2],
}

/// Key-range to sample mapping for one partial definition.
///
/// The sixteen break points are ascending key limits; entry `j` covers
/// keys up to and including `breaks[j]`, and 0x7f terminates the table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialDef {
    pub breaks: [u8; 16],
    pub samples: [u16; 16],
}

/// Control metadata for one PCM sample.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleDef {
    pub sample_len: u32,
    pub loop_len: u32,
    pub loop_mode: LoopMode,
    pub root_key: u8,
    /// Pitch correction, signed around 1024, sixteenths of a cent.
    pub pitch: u16,
    /// Sample volume, 0..=0x7f.
    pub volume: u8,
    /// Fine volume, signed around 1024.
    pub fine_volume: u16,
}

/// Decoded PCM data for one sample.
#[derive(Debug, Clone, Default)]
pub struct PcmSample {
    pub data: Vec<f32>,
}

/// The full control table set.
#[derive(Debug, Clone)]
pub struct ControlRom {
    instruments: Vec<Instrument>,
    partials: Vec<PartialDef>,
    samples: Vec<SampleDef>,
    generation: SynthGen,
}

impl ControlRom {
    pub fn new(
        instruments: Vec<Instrument>,
        partials: Vec<PartialDef>,
        samples: Vec<SampleDef>,
        generation: SynthGen,
    ) -> Self {
        Self {
            instruments,
            partials,
            samples,
            generation,
        }
    }

    pub fn instrument(&self, index: u16) -> Option<&Instrument> {
        self.instruments.get(index as usize)
    }

    pub fn partial(&self, index: u16) -> Option<&PartialDef> {
        self.partials.get(index as usize)
    }

    pub fn sample(&self, index: u16) -> Option<&SampleDef> {
        self.samples.get(index as usize)
    }

    pub fn generation(&self) -> SynthGen {
        self.generation
    }
}

/// The decoded PCM waveforms, indexed in step with the control samples.
#[derive(Debug, Clone, Default)]
pub struct PcmRom {
    samples: Vec<PcmSample>,
}

impl PcmRom {
    pub fn new(samples: Vec<PcmSample>) -> Self {
        Self { samples }
    }

    /// The waveform for a sample index; empty when the index is unknown.
    pub fn wave(&self, index: u16) -> &[f32] {
        self.samples
            .get(index as usize)
            .map(|s| s.data.as_slice())
            .unwrap_or(&[])
    }
}
