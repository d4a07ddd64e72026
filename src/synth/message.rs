//! Messages crossing from the control thread into the audio thread.
//!
//! Only note lifecycle events travel through the ring buffer; continuous
//! controllers, bend and SysEx land in the [`Settings`](crate::settings)
//! store directly and are picked up by voices through its atomic getters.

#[derive(Debug, Copy, Clone)]
pub enum SynthMessage {
    NoteOn { part: u8, key: u8, velocity: u8 },
    NoteOff { part: u8, key: u8 },
    AllNotesOff,
}
