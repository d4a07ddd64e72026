use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Convert a decoded MIDI event into an engine message.
///
/// Channels map 1:1 onto parts. Only note lifecycle events produce a
/// message; controllers, bend and program changes are applied to the
/// settings store by the control side and return `None` here.
pub fn midi_to_message(midi: MidiEvent) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } => Some(SynthMessage::NoteOn {
            part: channel,
            key,
            velocity,
        }),
        MidiEvent::NoteOff { channel, key, .. } => Some(SynthMessage::NoteOff { part: channel, key }),
        _ => None,
    }
}
