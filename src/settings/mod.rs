//! Shared parameter store.
//!
//! The control thread mutates parameters on MIDI channel messages and SysEx;
//! the audio thread reads them on every sample. Every parameter is a single
//! machine word, stored with `Release` and loaded with `Acquire`, so the
//! audio side can never observe a torn update and a change becomes audible
//! no later than the next frame boundary.
//!
//! Values keep their wire encodings: 7-bit controllers centre on 0x40,
//! 14-bit fine tune centres on 8192, the master tune word centres on 0x400.
//! Accessors return the raw encoded value; the composition code in the
//! voice layer owns the conversion maths.

use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU8, Ordering};

/// Index of a part, 0..[`NUM_PARTS`].
pub type PartId = usize;

pub const NUM_PARTS: usize = 16;
pub const NUM_DRUM_MAPS: usize = 2;

#[derive(Debug)]
struct PartParams {
    use_for_rhythm: AtomicU8,
    tone_number: AtomicU8,
    pitch_coarse_tune: AtomicU8,
    pitch_key_shift: AtomicU8,
    pitch_fine_tune: AtomicU16,
    pitch_offset_fine: AtomicU16,
    scale_tuning: [AtomicU8; 12],
    acc_amplitude_control: AtomicU8,
    tvfa_env_attack: AtomicU8,
    tvfa_env_decay: AtomicU8,
    tvfa_env_release: AtomicU8,
    vibrato_rate: AtomicU8,
    pitch_bend: AtomicU32,
}

impl PartParams {
    fn new() -> Self {
        Self {
            use_for_rhythm: AtomicU8::new(0),
            tone_number: AtomicU8::new(0),
            pitch_coarse_tune: AtomicU8::new(0x40),
            pitch_key_shift: AtomicU8::new(0x40),
            pitch_fine_tune: AtomicU16::new(8192),
            pitch_offset_fine: AtomicU16::new(0x080),
            scale_tuning: std::array::from_fn(|_| AtomicU8::new(0x40)),
            acc_amplitude_control: AtomicU8::new(0x40),
            tvfa_env_attack: AtomicU8::new(0x40),
            tvfa_env_decay: AtomicU8::new(0x40),
            tvfa_env_release: AtomicU8::new(0x40),
            vibrato_rate: AtomicU8::new(0x40),
            pitch_bend: AtomicU32::new(1.0_f32.to_bits()),
        }
    }
}

#[derive(Debug)]
struct DrumParams {
    play_key_number: [AtomicU8; 128],
    level: [AtomicU8; 128],
    panpot: [AtomicU8; 128],
    rx_note_off: [AtomicU8; 128],
}

impl DrumParams {
    fn new() -> Self {
        Self {
            play_key_number: std::array::from_fn(|_| AtomicU8::new(0x3c)),
            level: std::array::from_fn(|_| AtomicU8::new(0x7f)),
            panpot: std::array::from_fn(|_| AtomicU8::new(0x40)),
            rx_note_off: std::array::from_fn(|_| AtomicU8::new(1)),
        }
    }
}

/// The parameter store itself. One instance per synth, wrapped in `Arc`
/// and shared by the control side, the engine and every live voice.
#[derive(Debug)]
pub struct Settings {
    sample_rate: AtomicU32,
    tune: AtomicU16,
    key_shift: AtomicU8,
    parts: [PartParams; NUM_PARTS],
    drums: [DrumParams; NUM_DRUM_MAPS],
}

impl Settings {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: AtomicU32::new(sample_rate),
            tune: AtomicU16::new(0x400),
            key_shift: AtomicU8::new(0x40),
            parts: std::array::from_fn(|_| PartParams::new()),
            drums: std::array::from_fn(|_| DrumParams::new()),
        }
    }

    // System

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Acquire)
    }

    /// Master tune word, centre 0x400, tenths of a cent per step.
    pub fn tune(&self) -> u16 {
        self.tune.load(Ordering::Acquire)
    }

    pub fn set_tune(&self, value: u16) {
        self.tune.store(value.min(0x7ff), Ordering::Release);
    }

    pub fn key_shift(&self) -> u8 {
        self.key_shift.load(Ordering::Acquire)
    }

    pub fn set_key_shift(&self, value: u8) {
        self.key_shift.store(value.min(0x7f), Ordering::Release);
    }

    // Patch, per part

    pub fn use_for_rhythm(&self, part: PartId) -> u8 {
        self.parts[part].use_for_rhythm.load(Ordering::Acquire)
    }

    /// 0 = melodic, 1.. = drum set on map `value - 1`.
    pub fn set_use_for_rhythm(&self, part: PartId, value: u8) {
        self.parts[part]
            .use_for_rhythm
            .store(value.min(NUM_DRUM_MAPS as u8), Ordering::Release);
    }

    pub fn tone_number(&self, part: PartId) -> u8 {
        self.parts[part].tone_number.load(Ordering::Acquire)
    }

    pub fn set_tone_number(&self, part: PartId, value: u8) {
        self.parts[part]
            .tone_number
            .store(value.min(0x7f), Ordering::Release);
    }

    pub fn pitch_coarse_tune(&self, part: PartId) -> u8 {
        self.parts[part].pitch_coarse_tune.load(Ordering::Acquire)
    }

    pub fn set_pitch_coarse_tune(&self, part: PartId, value: u8) {
        self.parts[part]
            .pitch_coarse_tune
            .store(value.min(0x7f), Ordering::Release);
    }

    pub fn pitch_key_shift(&self, part: PartId) -> u8 {
        self.parts[part].pitch_key_shift.load(Ordering::Acquire)
    }

    pub fn set_pitch_key_shift(&self, part: PartId, value: u8) {
        self.parts[part]
            .pitch_key_shift
            .store(value.min(0x7f), Ordering::Release);
    }

    /// 14-bit fine tune, centre 8192.
    pub fn pitch_fine_tune(&self, part: PartId) -> u16 {
        self.parts[part].pitch_fine_tune.load(Ordering::Acquire)
    }

    pub fn set_pitch_fine_tune(&self, part: PartId, value: u16) {
        self.parts[part]
            .pitch_fine_tune
            .store(value.min(0x3fff), Ordering::Release);
    }

    /// Two-nibble fine frequency offset, centre 0x080, tenths of a Hz.
    pub fn pitch_offset_fine(&self, part: PartId) -> u16 {
        self.parts[part].pitch_offset_fine.load(Ordering::Acquire)
    }

    pub fn set_pitch_offset_fine(&self, part: PartId, value: u16) {
        self.parts[part]
            .pitch_offset_fine
            .store(value.min(0xff), Ordering::Release);
    }

    /// Scale tuning for a chromatic degree (0 = C), centre 0x40.
    pub fn scale_tuning(&self, part: PartId, degree: usize) -> u8 {
        self.parts[part].scale_tuning[degree].load(Ordering::Acquire)
    }

    pub fn set_scale_tuning(&self, part: PartId, degree: usize, value: u8) {
        self.parts[part].scale_tuning[degree].store(value.min(0x7f), Ordering::Release);
    }

    pub fn acc_amplitude_control(&self, part: PartId) -> u8 {
        self.parts[part]
            .acc_amplitude_control
            .load(Ordering::Acquire)
    }

    pub fn set_acc_amplitude_control(&self, part: PartId, value: u8) {
        self.parts[part]
            .acc_amplitude_control
            .store(value.min(0x7f), Ordering::Release);
    }

    pub fn tvfa_env_attack(&self, part: PartId) -> u8 {
        self.parts[part].tvfa_env_attack.load(Ordering::Acquire)
    }

    pub fn set_tvfa_env_attack(&self, part: PartId, value: u8) {
        self.parts[part]
            .tvfa_env_attack
            .store(value.min(0x7f), Ordering::Release);
    }

    pub fn tvfa_env_decay(&self, part: PartId) -> u8 {
        self.parts[part].tvfa_env_decay.load(Ordering::Acquire)
    }

    pub fn set_tvfa_env_decay(&self, part: PartId, value: u8) {
        self.parts[part]
            .tvfa_env_decay
            .store(value.min(0x7f), Ordering::Release);
    }

    pub fn tvfa_env_release(&self, part: PartId) -> u8 {
        self.parts[part].tvfa_env_release.load(Ordering::Acquire)
    }

    pub fn set_tvfa_env_release(&self, part: PartId, value: u8) {
        self.parts[part]
            .tvfa_env_release
            .store(value.min(0x7f), Ordering::Release);
    }

    pub fn vibrato_rate(&self, part: PartId) -> u8 {
        self.parts[part].vibrato_rate.load(Ordering::Acquire)
    }

    pub fn set_vibrato_rate(&self, part: PartId, value: u8) {
        self.parts[part]
            .vibrato_rate
            .store(value.min(0x7f), Ordering::Release);
    }

    /// Current pitch-bend factor for a part, 1.0 at rest.
    pub fn pitch_bend_factor(&self, part: PartId) -> f32 {
        f32::from_bits(self.parts[part].pitch_bend.load(Ordering::Acquire))
    }

    /// Store the bend factor from a raw 14-bit-centred bend value and the
    /// part's bend range in semitones.
    pub fn set_pitch_bend(&self, part: PartId, bend: i16, range_semitones: u8) {
        let semitones = bend as f32 / 8192.0 * range_semitones as f32;
        let factor = 2.0_f32.powf(semitones / 12.0);
        self.parts[part]
            .pitch_bend
            .store(factor.to_bits(), Ordering::Release);
    }

    // Drum, per map and key

    pub fn drum_play_key_number(&self, map: usize, key: u8) -> u8 {
        self.drums[map].play_key_number[key as usize].load(Ordering::Acquire)
    }

    pub fn set_drum_play_key_number(&self, map: usize, key: u8, value: u8) {
        self.drums[map].play_key_number[key as usize].store(value.min(0x7f), Ordering::Release);
    }

    pub fn drum_level(&self, map: usize, key: u8) -> u8 {
        self.drums[map].level[key as usize].load(Ordering::Acquire)
    }

    pub fn set_drum_level(&self, map: usize, key: u8, value: u8) {
        self.drums[map].level[key as usize].store(value.min(0x7f), Ordering::Release);
    }

    pub fn drum_panpot(&self, map: usize, key: u8) -> u8 {
        self.drums[map].panpot[key as usize].load(Ordering::Acquire)
    }

    pub fn set_drum_panpot(&self, map: usize, key: u8, value: u8) {
        self.drums[map].panpot[key as usize].store(value.min(0x7f), Ordering::Release);
    }

    pub fn drum_rx_note_off(&self, map: usize, key: u8) -> bool {
        self.drums[map].rx_note_off[key as usize].load(Ordering::Acquire) != 0
    }

    pub fn set_drum_rx_note_off(&self, map: usize, key: u8, value: bool) {
        self.drums[map].rx_note_off[key as usize].store(value as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_neutral() {
        let s = Settings::new(44100);
        assert_eq!(s.sample_rate(), 44100);
        assert_eq!(s.tune(), 0x400);
        assert_eq!(s.key_shift(), 0x40);
        for part in 0..NUM_PARTS {
            assert_eq!(s.use_for_rhythm(part), 0);
            assert_eq!(s.pitch_coarse_tune(part), 0x40);
            assert_eq!(s.pitch_fine_tune(part), 8192);
            assert_eq!(s.pitch_offset_fine(part), 0x080);
            assert_eq!(s.acc_amplitude_control(part), 0x40);
            assert_eq!(s.pitch_bend_factor(part), 1.0);
            for degree in 0..12 {
                assert_eq!(s.scale_tuning(part, degree), 0x40);
            }
        }
        assert!(s.drum_rx_note_off(0, 36));
        assert_eq!(s.drum_play_key_number(0, 36), 0x3c);
    }

    #[test]
    fn seven_bit_setters_clamp() {
        let s = Settings::new(44100);
        s.set_pitch_coarse_tune(3, 0xff);
        assert_eq!(s.pitch_coarse_tune(3), 0x7f);
        s.set_tune(0xffff);
        assert_eq!(s.tune(), 0x7ff);
        s.set_pitch_fine_tune(3, 0xffff);
        assert_eq!(s.pitch_fine_tune(3), 0x3fff);
    }

    #[test]
    fn pitch_bend_factor_covers_both_directions() {
        let s = Settings::new(44100);
        s.set_pitch_bend(0, 8191, 2);
        let up = s.pitch_bend_factor(0);
        assert!((up - 2.0_f32.powf(2.0 / 12.0)).abs() < 1e-3);

        s.set_pitch_bend(0, -8192, 2);
        let down = s.pitch_bend_factor(0);
        assert!((down - 2.0_f32.powf(-2.0 / 12.0)).abs() < 1e-6);

        s.set_pitch_bend(0, 0, 2);
        assert_eq!(s.pitch_bend_factor(0), 1.0);
    }

    #[test]
    fn drum_flags_roundtrip() {
        let s = Settings::new(44100);
        s.set_drum_rx_note_off(1, 40, false);
        assert!(!s.drum_rx_note_off(1, 40));
        assert!(s.drum_rx_note_off(0, 40));
        s.set_drum_level(1, 40, 0x90);
        assert_eq!(s.drum_level(1, 40), 0x7f);
    }
}
