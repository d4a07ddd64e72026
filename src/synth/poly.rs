use std::sync::Arc;

use rtrb::Consumer;

use crate::dsp::lfo::{Lfo, LfoPair};
use crate::rom::{ControlRom, PcmRom};
use crate::settings::{PartId, Settings, NUM_PARTS};
use crate::synth::{message::SynthMessage, note::Note};
use crate::MAX_BLOCK_SIZE;

struct PartLfos {
    shared: Arc<LfoPair>,
    gens: [Lfo; 2],
}

/// Polyphonic engine: owns the live note list and mixes stereo frames.
///
/// The audio thread calls [`render_block`](CanvasEngine::render_block);
/// the control thread pushes [`SynthMessage`]s into the producer side of
/// the ring buffer and mutates the settings store. Messages are drained at
/// the top of every block, so an event takes effect no later than the next
/// block boundary.
pub struct CanvasEngine {
    ctrl: Arc<ControlRom>,
    pcm: Arc<PcmRom>,
    settings: Arc<Settings>,
    rx: Consumer<SynthMessage>,
    notes: Vec<Note>,
    max_notes: usize,
    lfos: Vec<PartLfos>,
}

impl CanvasEngine {
    pub fn new(
        ctrl: Arc<ControlRom>,
        pcm: Arc<PcmRom>,
        settings: Arc<Settings>,
        max_notes: usize,
        rx: Consumer<SynthMessage>,
    ) -> Self {
        let sample_rate = settings.sample_rate();
        let lfos = (0..NUM_PARTS)
            .map(|part| {
                // Tenths of a Hz per step; the tremolo LFO runs a little
                // under the vibrato one so the two never phase-lock.
                let rate = settings.vibrato_rate(part) as f32 * 0.1;
                PartLfos {
                    shared: Arc::new(LfoPair::new()),
                    gens: [
                        Lfo::new(rate, sample_rate),
                        Lfo::new(rate * 0.8, sample_rate),
                    ],
                }
            })
            .collect();

        Self {
            ctrl,
            pcm,
            settings,
            rx,
            notes: Vec::with_capacity(max_notes),
            max_notes,
            lfos,
        }
    }

    /// Render interleaved stereo into `out`.
    pub fn render_block(&mut self, out: &mut [f32]) {
        debug_assert!(out.len() % 2 == 0, "stereo interleaved output expected");
        debug_assert!(
            out.len() / 2 <= MAX_BLOCK_SIZE,
            "block of {} frames exceeds MAX_BLOCK_SIZE",
            out.len() / 2
        );

        while let Ok(msg) = self.rx.pop() {
            match msg {
                SynthMessage::NoteOn {
                    part,
                    key,
                    velocity,
                } => {
                    let part = part as PartId;
                    if part >= NUM_PARTS {
                        continue;
                    }
                    if velocity == 0 {
                        self.note_off(part, key);
                    } else {
                        self.note_on(part, key);
                    }
                }
                SynthMessage::NoteOff { part, key } => {
                    let part = part as PartId;
                    if part < NUM_PARTS {
                        self.note_off(part, key);
                    }
                }
                SynthMessage::AllNotesOff => {
                    for note in &mut self.notes {
                        note.stop();
                    }
                }
            }
        }

        out.fill(0.0);
        for frame in out.chunks_exact_mut(2) {
            for pl in &mut self.lfos {
                pl.shared.publish(0, pl.gens[0].tick());
                pl.shared.publish(1, pl.gens[1].tick());
            }

            let mut acc = [0.0f32; 2];
            for note in &mut self.notes {
                note.render(&mut acc);
            }
            frame[0] = acc[0];
            frame[1] = acc[1];
        }

        // Finished notes are swept at block boundaries, off the hot path.
        self.notes.retain(|n| !n.finished());
    }

    pub fn active_notes(&self) -> usize {
        self.notes.len()
    }

    fn note_on(&mut self, part: PartId, key: u8) {
        let instrument = self.settings.tone_number(part) as u16;
        match Note::new(
            key,
            instrument,
            &self.ctrl,
            &self.pcm,
            &self.lfos[part].shared,
            &self.settings,
            part,
        ) {
            Ok(note) => {
                if self.notes.len() >= self.max_notes {
                    // Steal the oldest note outright.
                    self.notes.remove(0);
                }
                self.notes.push(note);
            }
            Err(e) => log::warn!("note on (part {part}, key {key}) ignored: {e}"),
        }
    }

    fn note_off(&mut self, part: PartId, key: u8) {
        for note in self
            .notes
            .iter_mut()
            .filter(|n| n.part() == part && n.key() == key)
        {
            note.stop();
        }
    }
}
