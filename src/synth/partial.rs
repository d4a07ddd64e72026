/*
Pitch corrections assembled per partial.

Static, fixed at note-on:
  - key difference between root key and played key (drums use the play-key
    table instead), adjusted by pitch key follow
  - sample pitch correction from the sample control record
  - master and part key shifts (drum parts only from SC-55mk2 on)
  - coarse/fine pitch from the partial definition

Dynamic, reassembled every output sample:
  - master tune and scale tuning
  - part fine tune and the fine frequency offset in Hz
  - pitch bend
  - vibrato and the pitch envelope (TVP)

All coarse terms are in semitones and collapse into the static tune ratio
once at construction; the dynamic terms multiply on top of it each tick.
*/

use std::sync::Arc;

use crate::dsp::cursor::SampleCursor;
use crate::dsp::lfo::LfoPair;
use crate::error::VoiceError;
use crate::rom::{ControlRom, InstPartial, PcmRom, SampleDef, SynthGen, UNUSED};
use crate::settings::{PartId, Settings};
use crate::synth::modulators::{Tva, Tvf, Tvp};

const EXP_FACTOR: f64 = std::f64::consts::LN_2 / 12000.0;

/// Convert a 7-bit volume index to a gain factor (0x7f maps to ~1.0).
fn convert_volume(volume: f64) -> f64 {
    0.1 * 2.0_f64.powf(volume / 36.7111) - 0.1
}

/// One sample-playback stream. A note owns up to two of these.
#[derive(Debug)]
pub struct Partial {
    key: u8,
    key_freq: f64,
    key_diff: f64,

    inst: InstPartial,
    sdef: SampleDef,
    sample_index: u16,
    pcm: Arc<PcmRom>,

    cursor: SampleCursor,
    static_pitch_tune: f64,

    settings: Arc<Settings>,
    part: PartId,
    is_drum: bool,
    drum_map: usize,

    tvp: Tvp,
    tvf: Tvf,
    tva: Tva,
}

impl Partial {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        key: u8,
        partial_id: usize,
        instrument_index: u16,
        ctrl: &ControlRom,
        pcm: Arc<PcmRom>,
        lfos: Arc<LfoPair>,
        settings: Arc<Settings>,
        part: PartId,
    ) -> Result<Self, VoiceError> {
        let inst = *ctrl
            .instrument(instrument_index)
            .ok_or(VoiceError::BadInstrument {
                index: instrument_index,
            })?
            .partials
            .get(partial_id)
            .ok_or(VoiceError::EmptyPartial {
                instrument: instrument_index,
                slot: partial_id,
            })?;
        if !inst.is_used() {
            return Err(VoiceError::EmptyPartial {
                instrument: instrument_index,
                slot: partial_id,
            });
        }

        let rhythm = settings.use_for_rhythm(part);
        let is_drum = rhythm != 0;

        // Coarse tuning collapses into a single key shift.
        let mut key_shift = settings.pitch_coarse_tune(part) as i32 - 0x40;
        if !is_drum {
            key_shift += settings.key_shift() as i32 - 0x40 + settings.pitch_key_shift(part) as i32
                - 0x40;
        } else if ctrl.generation() >= SynthGen::Sc55Mk2 {
            key_shift += settings.pitch_key_shift(part) as i32 - 0x40;
        }

        // Walk the break table with the shifted key.
        let pdef = ctrl
            .partial(inst.partial_index)
            .ok_or(VoiceError::NoSampleForKey {
                key,
                partial: inst.partial_index,
            })?;
        let mut sample_index = None;
        for j in 0..16 {
            if pdef.breaks[j] as i32 >= key as i32 + key_shift || pdef.breaks[j] == 0x7f {
                sample_index = Some(pdef.samples[j]);
                break;
            }
        }
        let sample_index = match sample_index {
            Some(idx) if idx != UNUSED => idx,
            _ => {
                log::error!(
                    "partial {}: break table has no sample for key {key}",
                    inst.partial_index
                );
                return Err(VoiceError::NoSampleForKey {
                    key,
                    partial: inst.partial_index,
                });
            }
        };
        let sdef = *ctrl
            .sample(sample_index)
            .ok_or(VoiceError::NoSampleForKey {
                key,
                partial: inst.partial_index,
            })?;

        let (drum_map, key_diff) = if is_drum {
            let map = (rhythm - 1) as usize;
            let play_key = settings.drum_play_key_number(map, key);
            (map, key_shift as f64 + play_key as f64 - 0x3c as f64)
        } else {
            (0, key as f64 + key_shift as f64 - sdef.root_key as f64)
        };

        let mut pitch_key_follow = 1.0;
        if inst.pitch_key_flw as i32 - 0x40 != 10 {
            pitch_key_follow += (inst.pitch_key_flw as f64 - 0x4a as f64) / 10.0;
        }

        // The -120 cent term is matched against hardware output; keep it.
        let static_pitch_tune = (((inst.coarse_pitch as f64 - 0x40 as f64
            + key_diff * pitch_key_follow)
            * 100.0
            + inst.fine_pitch as f64
            - 0x40 as f64
            + (sdef.pitch as f64 - 1024.0) / 16.0
            - 120.0)
            * std::f64::consts::LN_2
            / 1200.0)
            .exp()
            * 32000.0
            / settings.sample_rate() as f64;

        let tvp = Tvp::new(&inst, Arc::clone(&lfos), Arc::clone(&settings), part);
        let tvf = Tvf::new(&inst, Arc::clone(&lfos), Arc::clone(&settings), part);
        let tva = Tva::new(&inst, key, lfos, Arc::clone(&settings), part);

        Ok(Self {
            key,
            key_freq: 440.0 * 2.0_f64.powf((key as f64 - 69.0) / 12.0),
            key_diff,
            inst,
            sdef,
            sample_index,
            pcm,
            cursor: SampleCursor::new(),
            static_pitch_tune,
            settings,
            part,
            is_drum,
            drum_map,
            tvp,
            tvf,
            tva,
        })
    }

    /// Note-off. Uninterruptible drums (RxNoteOff disabled) keep playing.
    pub fn stop(&mut self) {
        if self.is_drum && !self.settings.drum_rx_note_off(self.drum_map, self.key) {
            return;
        }
        self.tvp.note_off();
        self.tvf.note_off();
        self.tva.note_off();
    }

    /// Render one frame into the caller's stereo accumulator. Returns true
    /// once the partial has terminated and should be dropped.
    pub fn next_sample(&mut self, out: &mut [f32; 2]) -> bool {
        if self.tva.finished() {
            return true;
        }

        // Dynamic pitch, reassembled every sample.
        let freq_key_tuned = self.key_freq
            + (self.settings.pitch_offset_fine(self.part) as f64 - 0x080 as f64) / 10.0;
        let pitch_offset_hz = freq_key_tuned / self.key_freq;

        let pitch_exp = self.settings.tune() as f64 - 0x400 as f64
            + (self
                .settings
                .scale_tuning(self.part, (self.key % 12) as usize) as f64
                - 0x40 as f64)
                * 10.0
            + (self.settings.pitch_fine_tune(self.part) as f64 - 8192.0) / 8.192;

        let pitch_adj = (pitch_exp * EXP_FACTOR).exp()
            * pitch_offset_hz
            * self.settings.pitch_bend_factor(self.part) as f64
            * self.static_pitch_tune
            * self.tvp.pitch();

        let wave = self.pcm.wave(self.sample_index);
        let raw = match self.cursor.advance(pitch_adj as f32, wave, &self.sdef) {
            Some(s) => s,
            None => return true,
        };

        let sample_vol = convert_volume(
            self.sdef.volume as f64 + (self.sdef.fine_volume as f64 - 1024.0) / 1000.0,
        );
        let partial_vol = convert_volume(self.inst.volume as f64);
        let drum_vol = if self.is_drum {
            convert_volume(self.settings.drum_level(self.drum_map, self.key) as f64)
        } else {
            1.0
        };
        let ctrl_vol = self.settings.acc_amplitude_control(self.part) as f64 / 64.0;

        let mut left = raw * sample_vol * partial_vol * drum_vol * ctrl_vol;

        // TVF stage currently not applied.

        left *= self.tva.amplification();
        let mut right = left;

        let panpot = if self.is_drum {
            (self.settings.drum_panpot(self.drum_map, self.key) as f64 - 0x40 as f64) / 64.0
        } else {
            (self.inst.panpot as f64 - 0x40 as f64) / 64.0
        };
        if panpot < 0.0 {
            right *= 1.0 + panpot;
        } else if panpot > 0.0 {
            left *= 1.0 - panpot;
        }

        out[0] += left as f32;
        out[1] += right as f32;

        false
    }

    pub fn key_diff(&self) -> f64 {
        self.key_diff
    }

    pub fn static_pitch_tune(&self) -> f64 {
        self.static_pitch_tune
    }

    pub fn cursor(&self) -> &SampleCursor {
        &self.cursor
    }
}
