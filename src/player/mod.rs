//! # Player Module
//!
//! Turn chord presses into NOTE_ON/NOTE_OFF messages without double-triggering or cutting off
//! shared notes.
//!
//! ## Sub-modules
//! - `ledger` - hold count per note number
//! - `engine` - [`NotePlayer`], dispatching messages to every registered output
//!
//! ## Reference Counting
//!
//! Two held chords may share a note (C major and E minor both contain G). Each note moves
//! between two states:
//!
//! - **Silent** (count 0) - a hold sends NOTE_ON to every output and enters Sounding
//! - **Sounding** (count >= 1) - further holds and releases only adjust the count; the
//!   release that brings it back to 0 sends NOTE_OFF
//!
//! A release with no matching hold is a logged no-op, so pointer-up followed by
//! pointer-leave for one gesture is harmless.
//!
//! ## Example
//! ```rust
//! use chordpad::output::MessageLog;
//! use chordpad::{Chord, NotePlayer, PitchClass, TriadType};
//!
//! let log = MessageLog::new();
//! let mut player = NotePlayer::new(Box::new(log.clone()));
//!
//! let c_major = Chord::new(PitchClass::C, 4, TriadType::Major);
//! let e_minor = Chord::new(PitchClass::new(4), 4, TriadType::Minor);
//!
//! player.play(&c_major);
//! player.play(&e_minor);
//! player.stop(&c_major);
//!
//! assert!(player.is_sounding(67)); // G4 is still held by E minor
//! assert_eq!(log.messages().len(), 5); // 60, 64, 67 on; 71 on; 60 off
//! ```

mod engine;
mod ledger;

#[cfg(test)]
mod tests;

pub use engine::{NotePlayer, DEFAULT_CHANNEL, DEFAULT_VELOCITY};
pub use ledger::Ledger;
