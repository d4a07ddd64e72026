/*
Level
      A      H      D        S          R
  1.0 ┐    ╱────╲
      │   ╱      ╲
  0.7 │  ╱        ╲──────────
      │ ╱                    ╲
  0.0 └╱──────────────────────╲─────→ Time
       Attack Hold Decay Sustain Release

Five-phase envelope as the Sound Canvas tone generator runs it. Each phase
has a target value, a 7-bit duration and a shape flag (linear or
logarithmic). One generator instance shapes exactly one parameter; a voice
carries three of them (pitch, filter, amplitude).

Durations are 7-bit table indices, not seconds. They convert through

    seconds(t) = 2^(t/18) / 5.45 - 0.183

which is an approximation of the control ROM's lookup curve. The 5.45 and
0.183 constants are matched against hardware recordings; do not "clean
them up". Amplitude envelopes additionally scale their phase times by
(1 - key/128) so high notes decay faster.

Attack, decay and release durations are offset at phase entry by the
part's envelope patch parameters (centre 0x40), clamped back to [0, 127].
*/

use std::sync::Arc;

use crate::settings::{PartId, Settings};

/// Envelope phase. `Off` exists only between construction and `start`.
///
/// The value/duration/shape tables are indexed by `phase - 1`, so the Off
/// slot has no table entry and can never be interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Off = 0,
    Attack = 1,
    Hold = 2,
    Decay = 3,
    Sustain = 4,
    Release = 5,
}

/// Convert a 7-bit phase duration to seconds.
///
/// `key` is present for amplitude envelopes only and shortens phase times
/// toward the top of the keyboard.
pub fn time_to_sec(time: u8, key: Option<u8>) -> f64 {
    let base = 2.0_f64.powf(time as f64 / 18.0) / 5.45 - 0.183;
    match key {
        Some(k) => base * (1.0 - k as f64 / 128.0),
        None => base,
    }
}

/// Five-phase AHDSR envelope generator.
///
/// All arithmetic is `f64`. The generator is advanced by exactly one call
/// to [`next`](Ahdsr::next) per output sample.
#[derive(Debug)]
pub struct Ahdsr {
    label: &'static str,
    sample_rate: u32,
    key: Option<u8>,
    settings: Arc<Settings>,
    part: PartId,

    value: [f64; 5],
    duration: [u8; 5],
    shape: [bool; 5],

    phase: Phase,
    terminal: Phase,
    phase_init: f64,
    sample_index: u32,
    sample_len: u32,
    current: f64,
    finished: bool,
}

impl Ahdsr {
    /// Full-form constructor used for amplitude envelopes: shape flags are
    /// honoured and phase times scale with `key`.
    pub fn new(
        value: [f64; 5],
        duration: [u8; 5],
        shape: [bool; 5],
        key: u8,
        settings: Arc<Settings>,
        part: PartId,
        label: &'static str,
    ) -> Self {
        Self {
            label,
            sample_rate: settings.sample_rate(),
            key: Some(key),
            settings,
            part,
            value,
            duration,
            shape,
            phase: Phase::Off,
            terminal: Phase::Release,
            phase_init: 0.0,
            sample_index: 0,
            sample_len: 0,
            current: 0.0,
            finished: false,
        }
    }

    /// Constructor for pitch and filter envelopes: starts from an explicit
    /// initial value, all phases linear, no key scaling.
    pub fn with_init(
        init: f64,
        value: [f64; 5],
        duration: [u8; 5],
        settings: Arc<Settings>,
        part: PartId,
        label: &'static str,
    ) -> Self {
        Self {
            label,
            sample_rate: settings.sample_rate(),
            key: None,
            settings,
            part,
            value,
            duration,
            shape: [false; 5],
            phase: Phase::Off,
            terminal: Phase::Release,
            phase_init: init,
            sample_index: 0,
            sample_len: 0,
            current: init,
            finished: false,
        }
    }

    /// Leave Off and enter Attack. Does nothing if already started.
    pub fn start(&mut self) {
        if self.phase != Phase::Off {
            return;
        }
        self.enter(Phase::Attack);
    }

    /// Force an immediate transition to the terminal phase. Idempotent.
    pub fn release(&mut self) {
        if self.phase == self.terminal {
            return;
        }
        self.enter(self.terminal);
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn value(&self) -> f64 {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advance one sample and return the current output value.
    pub fn next(&mut self) -> f64 {
        match self.phase {
            Phase::Off => {
                log::error!("{}: envelope pulled while in Off phase", self.label);
                return 0.0;
            }
            Phase::Attack => {
                if self.sample_index > self.sample_len {
                    self.enter(Phase::Hold);
                }
            }
            Phase::Hold => {
                if self.sample_index > self.sample_len {
                    self.enter(Phase::Decay);
                }
            }
            Phase::Decay => {
                if self.sample_index > self.sample_len {
                    self.enter(Phase::Sustain);
                }
            }
            Phase::Sustain => {
                if self.sample_index > self.sample_len {
                    if self.value[Phase::Sustain as usize - 1] == 0.0 {
                        self.enter(Phase::Release);
                    } else {
                        // Sustain can last forever.
                        return self.current;
                    }
                }
            }
            Phase::Release => {
                if self.sample_index > self.sample_len {
                    self.finished = true;
                    return 0.0;
                }
            }
        }

        let slot = self.phase as usize - 1;
        let target = self.value[slot];
        if self.sample_len == 0 {
            self.current = target;
        } else {
            let p = self.sample_index as f64 / self.sample_len as f64;
            self.current = if !self.shape[slot] {
                self.phase_init + (target - self.phase_init) * p
            } else {
                self.phase_init
                    + (target - self.phase_init) * ((10.0 * p + 1.0).log10() / 11.0_f64.log10())
            };
        }

        self.sample_index += 1;
        self.current
    }

    fn enter(&mut self, next: Phase) {
        if next == Phase::Off {
            log::error!("{}: envelope cannot re-enter Off", self.label);
            return;
        }

        self.phase_init = self.current;

        let mut total = self.duration[next as usize - 1] as i32;
        total += match next {
            Phase::Attack => self.settings.tvfa_env_attack(self.part) as i32 - 0x40,
            Phase::Decay => self.settings.tvfa_env_decay(self.part) as i32 - 0x40,
            Phase::Release => self.settings.tvfa_env_release(self.part) as i32 - 0x40,
            _ => 0,
        };
        let total = total.clamp(0, 127) as u8;

        let secs = time_to_sec(total, self.key);
        self.sample_len = (secs * self.sample_rate as f64).round() as u32;
        self.sample_index = 0;
        self.phase = next;
    }
}
