//! # Chord Model
//!
//! A chord is a plain value: root pitch class, octave, triad kind and an optional seventh.
//! Its absolute note numbers are derived on demand and never cached.
//!
//! ## Serialized Form
//! ```json
//! {"root": "C", "octave": 4, "type": "minor", "seventh": "minor"}
//! ```
//! `seventh` is omitted when absent. Missing fields fall back to the defaults
//! (C, octave 4, major, no seventh), so `{}` is a valid C major chord.
//!
//! ## Example
//! ```rust
//! use chordpad::{Chord, PitchClass, SeventhType, TriadType};
//!
//! let chord = Chord::new(PitchClass::C, 4, TriadType::Minor).with_seventh(SeventhType::Minor);
//! assert_eq!(chord.notes(), vec![60, 63, 67, 70]);
//! assert_eq!(chord.to_string(), "Cm7");
//! ```

use crate::error::ChordError;
use crate::theory::{PitchClass, SeventhType, TriadType};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_OCTAVE: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Chord {
    pub root: PitchClass,
    pub octave: i32,
    #[serde(rename = "type")]
    pub triad: TriadType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seventh: Option<SeventhType>,
}

impl Default for Chord {
    fn default() -> Self {
        Self {
            root: PitchClass::C,
            octave: DEFAULT_OCTAVE,
            triad: TriadType::Major,
            seventh: None,
        }
    }
}

impl Chord {
    pub fn new(root: PitchClass, octave: i32, triad: TriadType) -> Self {
        Self {
            root,
            octave,
            triad,
            seventh: None,
        }
    }

    pub fn with_seventh(mut self, seventh: SeventhType) -> Self {
        self.seventh = Some(seventh);
        self
    }

    /// Absolute note number of the root: `(octave + 1) * 12 + pitch class`.
    /// Saturates at the `i32` bounds for extreme octaves.
    pub fn base_note(&self) -> i32 {
        self.octave
            .saturating_add(1)
            .saturating_mul(12)
            .saturating_add(self.root.number() as i32)
    }

    /// Absolute note numbers, triad first, then the seventh if any.
    pub fn notes(&self) -> Vec<i32> {
        let base = self.base_note();
        let mut notes: Vec<i32> = self
            .triad
            .offsets()
            .iter()
            .map(|&offset| base.saturating_add(offset as i32))
            .collect();
        if let Some(seventh) = self.seventh {
            notes.push(base.saturating_add(seventh.offset() as i32));
        }
        notes
    }

    pub fn to_json(&self) -> Result<String, ChordError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ChordError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.triad.suffix())?;
        if let Some(seventh) = self.seventh {
            f.write_str(seventh.suffix())?;
        }
        Ok(())
    }
}
