//! Reference-counted note dispatch to sound outputs.

use super::ledger::Ledger;
use crate::chord::Chord;
use crate::error::ChordError;
use crate::output::{MidiMessage, SoundOutput};
use tracing::{debug, warn};

pub const DEFAULT_CHANNEL: u8 = 0;
pub const DEFAULT_VELOCITY: u8 = 100;

pub struct NotePlayer {
    ledger: Ledger,
    outputs: Vec<Box<dyn SoundOutput>>,
    channel: u8,
    velocity: u8,
}

impl NotePlayer {
    /// Player on channel 0 at velocity 100. `primary` is always the first output.
    pub fn new(primary: Box<dyn SoundOutput>) -> Self {
        Self {
            ledger: Ledger::new(),
            outputs: vec![primary],
            channel: DEFAULT_CHANNEL,
            velocity: DEFAULT_VELOCITY,
        }
    }

    /// Set the MIDI channel (0-15) and the note velocity (1-127).
    pub fn with_settings(mut self, channel: u8, velocity: u8) -> Result<Self, ChordError> {
        if channel > 15 {
            return Err(ChordError::Config(format!(
                "channel must be 0-15, got {}",
                channel
            )));
        }
        if !(1..=127).contains(&velocity) {
            return Err(ChordError::Config(format!(
                "velocity must be 1-127, got {}",
                velocity
            )));
        }
        self.channel = channel;
        self.velocity = velocity;
        Ok(self)
    }

    /// Register another output after the existing ones. Notes already sounding are not
    /// replayed on it.
    pub fn add_output(&mut self, output: Box<dyn SoundOutput>) {
        debug!(output = output.name(), "registered sound output");
        self.outputs.push(output);
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|output| output.name()).collect()
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn play(&mut self, chord: &Chord) {
        for note in playable_notes(chord) {
            if self.ledger.hold(note) {
                self.broadcast(MidiMessage::note_on(self.channel, note, self.velocity));
            }
        }
    }

    pub fn stop(&mut self, chord: &Chord) {
        for note in playable_notes(chord) {
            match self.ledger.release(note) {
                Ok(true) => {
                    self.broadcast(MidiMessage::note_off(self.channel, note, self.velocity))
                }
                Ok(false) => {}
                Err(e) => warn!(chord = %chord, error = %e, "ignoring release"),
            }
        }
    }

    /// Silence every sounding note regardless of hold counts.
    pub fn stop_all(&mut self) {
        let notes: Vec<u8> = self.ledger.notes().collect();
        self.ledger = Ledger::new();
        for note in notes {
            self.broadcast(MidiMessage::note_off(self.channel, note, self.velocity));
        }
    }

    pub fn hold_count(&self, note: u8) -> u32 {
        self.ledger.count(note)
    }

    pub fn is_sounding(&self, note: u8) -> bool {
        self.ledger.count(note) > 0
    }

    pub fn sounding_notes(&self) -> Vec<u8> {
        self.ledger.notes().collect()
    }

    fn broadcast(&mut self, message: MidiMessage) {
        for output in self.outputs.iter_mut() {
            debug!(output = output.name(), bytes = ?message.to_bytes(), "send");
            output.send(message);
        }
    }
}

/// Chord notes that fit in a MIDI note number.
fn playable_notes(chord: &Chord) -> impl Iterator<Item = u8> + '_ {
    chord
        .notes()
        .into_iter()
        .filter_map(move |note| match u8::try_from(note) {
            Ok(n) if n <= 127 => Some(n),
            _ => {
                warn!(chord = %chord, note, "note out of MIDI range, skipped");
                None
            }
        })
}
