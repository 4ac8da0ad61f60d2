pub mod chord;
pub mod collection;
pub mod config;
pub mod error;
pub mod layout;
pub mod output;
pub mod pad;
pub mod player;
pub mod theory;

pub use chord::Chord;
pub use collection::{ChordList, ChordListStore, JsonDirStore, MemoryStore};
pub use config::PadConfig;
pub use error::*;
pub use layout::{LayoutKind, LayoutSpec, PlacedChord, Placement, Ring};
pub use output::{MidiMessage, SoundOutput};
pub use pad::{ChordPad, HoldId};
pub use player::NotePlayer;
pub use theory::{PitchClass, SeventhType, TriadType};

/// Generate the chords of a layout from its string selectors.
/// This is the main entry point for configuration surfaces.
///
/// ```rust
/// let chords = chordpad::generate_layout("triads-major", "C", 4).unwrap();
/// let labels: Vec<String> = chords.iter().map(|c| c.to_string()).collect();
/// assert_eq!(labels, ["C", "Dm", "Em", "F", "G", "Am", "B°"]);
/// ```
pub fn generate_layout(kind: &str, root: &str, octave: i32) -> Result<Vec<Chord>, ChordError> {
    LayoutSpec::parse(kind, root, octave)?.generate()
}
