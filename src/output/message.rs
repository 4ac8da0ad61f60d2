//! Three-byte channel voice messages exchanged with sound outputs.

pub const NOTE_ON: u8 = 0x90;
pub const NOTE_OFF: u8 = 0x80;

/// `[status, note, velocity]`, status = message type | channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MidiMessage {
    pub status: u8,
    pub note: u8,
    pub velocity: u8,
}

/// What a message means to an output that only understands notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    On { note: u8, velocity: u8 },
    Off { note: u8 },
    Other,
}

impl MidiMessage {
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            status: NOTE_ON | (channel & 0x0F),
            note: note & 0x7F,
            velocity: velocity & 0x7F,
        }
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            status: NOTE_OFF | (channel & 0x0F),
            note: note & 0x7F,
            velocity: velocity & 0x7F,
        }
    }

    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        let [status, note, velocity] = bytes;
        Self {
            status,
            note,
            velocity,
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.status, self.note, self.velocity]
    }

    pub fn channel(self) -> u8 {
        self.status & 0x0F
    }

    /// NOTE_ON with velocity 0 counts as NOTE_OFF.
    pub fn event(self) -> NoteEvent {
        match self.status & 0xF0 {
            NOTE_ON if self.velocity > 0 => NoteEvent::On {
                note: self.note,
                velocity: self.velocity,
            },
            NOTE_ON | NOTE_OFF => NoteEvent::Off { note: self.note },
            _ => NoteEvent::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_bytes() {
        assert_eq!(MidiMessage::note_on(0, 60, 100).to_bytes(), [0x90, 60, 100]);
        assert_eq!(MidiMessage::note_off(3, 67, 100).to_bytes(), [0x83, 67, 100]);
        assert_eq!(MidiMessage::note_on(9, 60, 100).channel(), 9);
    }

    #[test]
    fn test_event_classification() {
        assert_eq!(
            MidiMessage::from_bytes([0x91, 64, 20]).event(),
            NoteEvent::On { note: 64, velocity: 20 }
        );
        assert_eq!(
            MidiMessage::from_bytes([0x90, 64, 0]).event(),
            NoteEvent::Off { note: 64 }
        );
        assert_eq!(
            MidiMessage::from_bytes([0x80, 64, 100]).event(),
            NoteEvent::Off { note: 64 }
        );
        assert_eq!(MidiMessage::from_bytes([0xB0, 7, 100]).event(), NoteEvent::Other);
    }
}
