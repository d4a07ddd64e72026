//! A sounding note: up to two partials layered behind one key.

use std::sync::Arc;

use crate::dsp::lfo::LfoPair;
use crate::error::VoiceError;
use crate::rom::{ControlRom, PcmRom};
use crate::settings::{PartId, Settings};
use crate::synth::partial::Partial;

pub struct Note {
    key: u8,
    part: PartId,
    partials: Vec<Partial>,
}

impl Note {
    /// Build the note's partials from the instrument record. Empty slots
    /// are skipped; a note with no playable partial is an error and is
    /// never inserted into the live list.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        key: u8,
        instrument_index: u16,
        ctrl: &ControlRom,
        pcm: &Arc<PcmRom>,
        lfos: &Arc<LfoPair>,
        settings: &Arc<Settings>,
        part: PartId,
    ) -> Result<Self, VoiceError> {
        let instrument = ctrl
            .instrument(instrument_index)
            .ok_or(VoiceError::BadInstrument {
                index: instrument_index,
            })?;

        let mut partials = Vec::with_capacity(2);
        let mut last_err = None;
        for slot in 0..instrument.partials.len() {
            if !instrument.partials[slot].is_used() {
                continue;
            }
            match Partial::new(
                key,
                slot,
                instrument_index,
                ctrl,
                Arc::clone(pcm),
                Arc::clone(lfos),
                Arc::clone(settings),
                part,
            ) {
                Ok(p) => partials.push(p),
                Err(e) => {
                    log::error!("note on key {key}: dropping partial {slot}: {e}");
                    last_err = Some(e);
                }
            }
        }

        if partials.is_empty() {
            return Err(last_err.unwrap_or(VoiceError::EmptyPartial {
                instrument: instrument_index,
                slot: 0,
            }));
        }

        Ok(Self {
            key,
            part,
            partials,
        })
    }

    pub fn key(&self) -> u8 {
        self.key
    }

    pub fn part(&self) -> PartId {
        self.part
    }

    /// Note-off: forwarded to every partial (drums may ignore it).
    pub fn stop(&mut self) {
        for p in &mut self.partials {
            p.stop();
        }
    }

    /// Accumulate one stereo frame. Terminated partials are dropped on the
    /// spot; the note is finished once none remain.
    pub fn render(&mut self, frame: &mut [f32; 2]) -> bool {
        self.partials.retain_mut(|p| !p.next_sample(frame));
        self.partials.is_empty()
    }

    pub fn finished(&self) -> bool {
        self.partials.is_empty()
    }
}
