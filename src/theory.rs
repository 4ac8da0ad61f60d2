//! # Note Theory
//!
//! Pitch-class arithmetic and the fixed interval tables everything else is built on.
//!
//! ## Tables
//! - **Note names**: one C-rooted, 12-entry table. Sharps are spelled `♯`, the only flat
//!   is `B♭`. `name_to_number` and `number_to_name` are inverse bijections modulo 12.
//! - **Triads**: closed set of four shapes, as semitone offsets from the root:
//!   major `[0, 4, 7]`, minor `[0, 3, 7]`, diminished `[0, 3, 6]`, augmented `[0, 4, 8]`.
//! - **Sevenths**: one extra offset above the root: diminished `9`, minor `10`, major `11`.
//! - **Scales**: major, natural minor and harmonic minor, 7 ascending offsets each.
//!
//! ## Absolute Note Numbers
//! `(octave + 1) * 12 + pitch_class`, so C4 = 60 (middle C).
//!
//! ## Example
//! ```rust
//! use chordpad::theory::{find_triad_type, name_to_number, number_to_name, TriadType};
//!
//! assert_eq!(name_to_number("G").unwrap(), 7);
//! assert_eq!(number_to_name(-1), "B");
//! assert_eq!(find_triad_type(&[0, 3, 6]).unwrap(), TriadType::Diminished);
//! ```

use crate::error::ChordError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Note names indexed by pitch class.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C♯", "D", "D♯", "E", "F", "F♯", "G", "G♯", "A", "B♭", "B",
];

pub const SCALE_MAJOR: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
pub const SCALE_MINOR_NATURAL: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];
pub const SCALE_MINOR_HARMONIC: [u8; 7] = [0, 2, 3, 5, 7, 8, 11];

/// Look up the pitch class of a name from [`NOTE_NAMES`]. The match is exact.
pub fn name_to_number(name: &str) -> Result<u8, ChordError> {
    NOTE_NAMES
        .iter()
        .position(|n| *n == name)
        .map(|i| i as u8)
        .ok_or_else(|| ChordError::InvalidNoteName(name.to_string()))
}

/// Name of any integer, wrapped into `0..12`.
pub fn number_to_name(n: i32) -> &'static str {
    NOTE_NAMES[n.rem_euclid(12) as usize]
}

/// Classify an ordered offset triple. Never falls back to a default.
pub fn find_triad_type(offsets: &[u8]) -> Result<TriadType, ChordError> {
    TriadType::ALL
        .into_iter()
        .find(|t| t.offsets().as_slice() == offsets)
        .ok_or_else(|| ChordError::UnrecognizedChordShape(offsets.to_vec()))
}

/// Equal-tempered note identity independent of octave, always in `0..12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Wraps any integer into a pitch class.
    pub fn new(n: i32) -> Self {
        PitchClass(n.rem_euclid(12) as u8)
    }

    pub fn from_name(name: &str) -> Result<Self, ChordError> {
        name_to_number(name).map(PitchClass)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.0 as usize]
    }

    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass::new(self.0 as i32 + semitones)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the table spellings plus ASCII `#`/`b` accidentals (`"C#"`, `"Bb"`).
impl FromStr for PitchClass {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized: String = trimmed
            .char_indices()
            .map(|(i, c)| match c {
                '#' if i > 0 => '♯',
                'b' if i > 0 => '♭',
                other => other,
            })
            .collect();
        PitchClass::from_name(&normalized)
            .map_err(|_| ChordError::InvalidNoteName(trimmed.to_string()))
    }
}

impl Serialize for PitchClass {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for PitchClass {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        PitchClass::from_name(&name).map_err(serde::de::Error::custom)
    }
}

/// Triad kind, classified by interval shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriadType {
    #[default]
    Major,
    Minor,
    Diminished,
    Augmented,
}

impl TriadType {
    pub const ALL: [TriadType; 4] = [
        TriadType::Major,
        TriadType::Minor,
        TriadType::Diminished,
        TriadType::Augmented,
    ];

    /// Semitone offsets from the root, strictly ascending from 0.
    pub fn offsets(self) -> [u8; 3] {
        match self {
            TriadType::Major => [0, 4, 7],
            TriadType::Minor => [0, 3, 7],
            TriadType::Diminished => [0, 3, 6],
            TriadType::Augmented => [0, 4, 8],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TriadType::Major => "major",
            TriadType::Minor => "minor",
            TriadType::Diminished => "diminished",
            TriadType::Augmented => "augmented",
        }
    }

    /// Label suffix: `C`, `Cm`, `C°`, `C+`.
    pub fn suffix(self) -> &'static str {
        match self {
            TriadType::Major => "",
            TriadType::Minor => "m",
            TriadType::Diminished => "°",
            TriadType::Augmented => "+",
        }
    }
}

/// Seventh added on top of a triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeventhType {
    Diminished,
    Minor,
    Major,
}

impl SeventhType {
    pub fn offset(self) -> u8 {
        match self {
            SeventhType::Diminished => 9,
            SeventhType::Minor => 10,
            SeventhType::Major => 11,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            SeventhType::Diminished => "6",
            SeventhType::Minor => "7",
            SeventhType::Major => "M7",
        }
    }
}

/// Seven-degree scale used to derive triad layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Major,
    NaturalMinor,
    HarmonicMinor,
}

impl Scale {
    pub fn offsets(self) -> &'static [u8; 7] {
        match self {
            Scale::Major => &SCALE_MAJOR,
            Scale::NaturalMinor => &SCALE_MINOR_NATURAL,
            Scale::HarmonicMinor => &SCALE_MINOR_HARMONIC,
        }
    }

    /// Triad kinds of the seven scale degrees, in degree order.
    ///
    /// Degree `i` stacks scale degrees `i`, `i+2`, `i+4` (wrapping into the next octave)
    /// and measures each against the degree's own offset.
    pub fn degree_triads(self) -> Result<[(u8, TriadType); 7], ChordError> {
        let scale = self.offsets();
        let mut result = [(0, TriadType::Major); 7];
        for (degree, &own) in scale.iter().enumerate() {
            let mut shape = [0usize, 2, 4].map(|step| {
                let tone = scale[(degree + step) % scale.len()];
                (tone + 12 - own) % 12
            });
            shape.sort_unstable();
            result[degree] = (own, find_triad_type(&shape)?);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for name in NOTE_NAMES {
            let n = name_to_number(name).unwrap();
            assert_eq!(number_to_name(n as i32), name);
        }
    }

    #[test]
    fn test_number_to_name_wraps() {
        for n in -40..40 {
            let name = number_to_name(n);
            assert_eq!(name_to_number(name).unwrap() as i32, n.rem_euclid(12));
        }
        assert_eq!(number_to_name(12), "C");
        assert_eq!(number_to_name(-3), "A");
    }

    #[test]
    fn test_invalid_name() {
        assert!(matches!(
            name_to_number("H"),
            Err(ChordError::InvalidNoteName(n)) if n == "H"
        ));
        // exact lookup: ASCII spelling is not a table entry
        assert!(name_to_number("C#").is_err());
    }

    #[test]
    fn test_pitch_class_from_str_accepts_ascii() {
        assert_eq!("C#".parse::<PitchClass>().unwrap().number(), 1);
        assert_eq!("Bb".parse::<PitchClass>().unwrap().number(), 10);
        assert_eq!("B".parse::<PitchClass>().unwrap().number(), 11);
        assert_eq!("F♯".parse::<PitchClass>().unwrap().number(), 6);
        assert!("Db".parse::<PitchClass>().is_err());
    }

    #[test]
    fn test_find_triad_type() {
        for t in TriadType::ALL {
            assert_eq!(find_triad_type(&t.offsets()).unwrap(), t);
        }
        assert!(matches!(
            find_triad_type(&[0, 5, 7]),
            Err(ChordError::UnrecognizedChordShape(s)) if s == vec![0, 5, 7]
        ));
        // compared as sequences, not sets
        assert!(find_triad_type(&[7, 4, 0]).is_err());
    }

    #[test]
    fn test_major_scale_triads() {
        let kinds: Vec<TriadType> = Scale::Major
            .degree_triads()
            .unwrap()
            .iter()
            .map(|(_, t)| *t)
            .collect();
        use TriadType::*;
        assert_eq!(
            kinds,
            vec![Major, Minor, Minor, Major, Major, Minor, Diminished]
        );
    }

    #[test]
    fn test_minor_scale_triads() {
        use TriadType::*;
        let natural: Vec<TriadType> = Scale::NaturalMinor
            .degree_triads()
            .unwrap()
            .iter()
            .map(|(_, t)| *t)
            .collect();
        assert_eq!(
            natural,
            vec![Minor, Diminished, Major, Minor, Minor, Major, Major]
        );

        let harmonic: Vec<TriadType> = Scale::HarmonicMinor
            .degree_triads()
            .unwrap()
            .iter()
            .map(|(_, t)| *t)
            .collect();
        assert_eq!(
            harmonic,
            vec![Minor, Diminished, Augmented, Minor, Major, Major, Diminished]
        );
    }

    #[test]
    fn test_scales_ascending_within_octave() {
        for scale in [Scale::Major, Scale::NaturalMinor, Scale::HarmonicMinor] {
            let offsets = scale.offsets();
            assert_eq!(offsets[0], 0);
            assert!(offsets.windows(2).all(|w| w[0] < w[1]));
            assert!(offsets.iter().all(|&o| o < 12));
        }
    }
}
