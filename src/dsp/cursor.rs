/*
Sample cursor
=============

A fractional read position over an immutable PCM buffer. Every output
sample the owner computes a pitch adjustment (source samples consumed per
output sample) and calls `advance`. The cursor walks its integer read
position `last_pos` toward `round(index)`, feeding each consumed PCM value
through two cascaded one-pole reconstruction filters, and returns the last
filtered value.

Loop topologies at the sample boundary:

  mode 0, forward loop     [0 ............ s-l-1 ######## s-1]
                           position jumps back to the loop start and keeps
                           moving forward. The overshoot past the end is
                           carried into the loop so the fractional phase
                           is preserved.

  mode 1, ping-pong        [0 ............ s-l ########>< s-1]
                           direction flips to backward at the end and back
                           to forward at the loop start, mirroring the
                           overshoot both times.

  mode 2, forward stop     playback terminates past the end.

The forward resync after a loop jump walks while round(index) > last_pos;
the turnaround resyncs walk while round(index) < last_pos. The asymmetry
is deliberate and matches the tone generator; do not unify the two.
*/

use crate::dsp::one_pole::OnePole;
use crate::rom::{LoopMode, SampleDef};

/// Read direction of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Fractional position over a PCM buffer with loop handling and the
/// two-stage reconstruction filter the consumed values run through.
#[derive(Debug)]
pub struct SampleCursor {
    index: f32,
    last_pos: i64,
    direction: Direction,
    rf1: OnePole,
    rf2: OnePole,
    sample: f64,
}

impl SampleCursor {
    pub fn new() -> Self {
        Self {
            index: 0.0,
            last_pos: 0,
            direction: Direction::Forward,
            rf1: OnePole::new(32000, 15),
            rf2: OnePole::new(32000, 15),
            sample: 0.0,
        }
    }

    /// Advance by `pitch_adj` source samples and return the latest filtered
    /// value, or `None` once a forward-stop sample has run past its end.
    pub fn advance(&mut self, pitch_adj: f32, pcm: &[f32], meta: &SampleDef) -> Option<f64> {
        let len = meta.sample_len as i64;
        let loop_len = meta.loop_len as i64;

        match self.direction {
            Direction::Forward => {
                self.index += pitch_adj;

                while (self.index.round() as i64) > self.last_pos && self.last_pos < len - 1 {
                    self.consume(pcm, self.last_pos);
                    self.last_pos += 1;
                }

                // The -1 leaves one sample of headroom for interpolation.
                if self.index > (len - 1) as f32 {
                    let remaining = (len as f32 - self.index).abs();

                    match meta.loop_mode {
                        LoopMode::Forward => {
                            self.index = (len - loop_len - 1) as f32 + remaining;
                            self.last_pos = len - loop_len - 1;

                            while (self.index.round() as i64) > self.last_pos {
                                self.consume(pcm, self.last_pos);
                                self.last_pos += 1;
                            }
                        }
                        LoopMode::PingPong => {
                            self.index = len as f32 - remaining - 1.0;
                            self.direction = Direction::Backward;

                            while (self.index.round() as i64) < self.last_pos {
                                self.consume(pcm, self.last_pos);
                                self.last_pos -= 1;
                            }
                        }
                        LoopMode::OneShot => return None,
                    }
                }
            }
            Direction::Backward => {
                self.index -= pitch_adj;

                while (self.index.round() as i64) < self.last_pos && self.last_pos > len - loop_len
                {
                    self.consume(pcm, self.last_pos);
                    self.last_pos -= 1;
                }

                if self.index < (len - loop_len - 1) as f32 {
                    // Flush whatever is left on the way down.
                    while self.last_pos > len - loop_len - 1 {
                        self.consume(pcm, self.last_pos);
                        self.last_pos -= 1;
                    }

                    let remaining = (len - loop_len) as f32 - self.index;

                    self.index = (len - loop_len) as f32 + remaining;
                    self.direction = Direction::Forward;

                    self.last_pos = len - loop_len;
                    while (self.index.round() as i64) < self.last_pos {
                        self.consume(pcm, self.last_pos);
                        self.last_pos += 1;
                    }
                }
            }
        }

        Some(self.sample)
    }

    #[inline]
    fn consume(&mut self, pcm: &[f32], pos: i64) {
        let raw = if pos >= 0 {
            pcm.get(pos as usize).copied().unwrap_or(0.0)
        } else {
            0.0
        };
        self.sample = self.rf2.apply(self.rf1.apply(raw as f64));
    }

    pub fn position(&self) -> f32 {
        self.index
    }

    pub fn last_pos(&self) -> i64 {
        self.last_pos
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl Default for SampleCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32 / n as f32).collect()
    }

    fn meta(len: u32, loop_len: u32, mode: LoopMode) -> SampleDef {
        SampleDef {
            sample_len: len,
            loop_len,
            loop_mode: mode,
            root_key: 60,
            pitch: 1024,
            volume: 127,
            fine_volume: 1024,
        }
    }

    #[test]
    fn forward_loop_stays_in_loop_window() {
        let pcm = ramp(100);
        let meta = meta(100, 20, LoopMode::Forward);
        let mut cursor = SampleCursor::new();

        for _ in 0..200 {
            assert!(cursor.advance(1.0, &pcm, &meta).is_some());
        }

        let pos = cursor.position().round() as i64;
        assert!(
            (79..=99).contains(&pos),
            "cursor escaped the loop window: {pos}"
        );
        assert_eq!(cursor.direction(), Direction::Forward);
        assert!((79..=99).contains(&cursor.last_pos()));
    }

    #[test]
    fn forward_loop_reanchors_with_overshoot() {
        let pcm = ramp(100);
        let meta = meta(100, 20, LoopMode::Forward);
        let mut cursor = SampleCursor::new();

        // 99 unit steps land exactly on index 99; the next one overshoots.
        for _ in 0..99 {
            cursor.advance(1.0, &pcm, &meta);
        }
        assert_eq!(cursor.position(), 99.0);

        cursor.advance(1.0, &pcm, &meta);
        // remaining = |100 - 100| = 0, so index lands on the loop start.
        assert_eq!(cursor.position().round() as i64, 79);
        assert_eq!(cursor.last_pos(), 79);
    }

    #[test]
    fn ping_pong_alternates_direction_and_mirrors() {
        let pcm = ramp(100);
        let meta = meta(100, 100, LoopMode::PingPong);
        let mut cursor = SampleCursor::new();

        let mut flips = 0;
        let mut last_dir = cursor.direction();
        for _ in 0..450 {
            assert!(cursor.advance(1.0, &pcm, &meta).is_some());
            let dir = cursor.direction();
            if dir != last_dir {
                flips += 1;
                last_dir = dir;
            }
            let pos = cursor.position();
            assert!(
                (-1.5..100.0).contains(&pos),
                "ping-pong position out of range: {pos}"
            );
        }
        // 450 unit steps across a 100-sample buffer turn around 4 times.
        assert_eq!(flips, 4);
    }

    #[test]
    fn one_shot_terminates_and_stays_terminated() {
        let pcm = ramp(50);
        let meta = meta(50, 0, LoopMode::OneShot);
        let mut cursor = SampleCursor::new();

        let mut terminated_at = None;
        for i in 0..80 {
            if cursor.advance(1.0, &pcm, &meta).is_none() {
                terminated_at = Some(i);
                break;
            }
        }
        let at = terminated_at.expect("one-shot sample should terminate");
        assert!((48..=51).contains(&at), "terminated at {at}");

        for _ in 0..10 {
            assert!(cursor.advance(1.0, &pcm, &meta).is_none());
        }
    }

    #[test]
    fn position_and_last_pos_track_each_other() {
        let pcm = ramp(100);
        let meta = meta(100, 40, LoopMode::Forward);
        let mut cursor = SampleCursor::new();

        for _ in 0..500 {
            cursor.advance(0.73, &pcm, &meta);
            let drift = (cursor.position().round() as i64 - cursor.last_pos()).abs();
            assert!(drift <= 1, "cursor positions diverged by {drift}");
        }
    }

    #[test]
    fn filtered_output_follows_ramp() {
        let pcm = ramp(100);
        let meta = meta(100, 20, LoopMode::Forward);
        let mut cursor = SampleCursor::new();

        // Over the initial run-up the ramp input is monotonic, so the
        // low-pass output must be monotonic too.
        let mut last = -1.0;
        for _ in 0..90 {
            let v = cursor.advance(1.0, &pcm, &meta).unwrap();
            assert!(v >= last, "lowpassed ramp must not decrease");
            last = v;
        }
    }
}
