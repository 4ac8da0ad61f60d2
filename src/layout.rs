//! # Layout Generator
//!
//! Produces the ordered chord sequence shown on the pad for a layout kind, root and octave.
//!
//! ## Layout Kinds
//! - `fifths` - two rings of 12 chords stepping by 5 semitones. The outer ring starts at the
//!   root and is all major; the inner ring starts 9 semitones above the root and is all minor.
//!   The outer ring comes first, each ring in step order.
//! - `triads-major`, `triads-minor-natural`, `triads-minor-harmonic` - the seven diatonic
//!   triads of the matching scale, in degree order.
//!
//! ## Placement
//! Each generated chord carries a [`Placement`] (position in its ring and which ring).
//! This is display data only: [`PlacedChord::detach`] drops it and returns the bare chord.
//!
//! ## Example
//! ```rust
//! use chordpad::layout::{LayoutKind, LayoutSpec};
//! use chordpad::PitchClass;
//!
//! let spec = LayoutSpec::new(LayoutKind::TriadsMajor, PitchClass::C, 4);
//! let labels: Vec<String> = spec.generate().unwrap().iter().map(|c| c.to_string()).collect();
//! assert_eq!(labels, ["C", "Dm", "Em", "F", "G", "Am", "B°"]);
//! ```

use crate::chord::{Chord, DEFAULT_OCTAVE};
use crate::error::ChordError;
use crate::theory::{PitchClass, Scale, TriadType};
use std::fmt;
use std::str::FromStr;

/// Step between neighbours on the circle of fifths (a fourth up is a fifth down).
const FIFTHS_STEP: i32 = 5;
/// Offset of the inner (minor) ring relative to the root.
const INNER_RING_OFFSET: i32 = 9;
const RING_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutKind {
    #[default]
    Fifths,
    TriadsMajor,
    TriadsMinorNatural,
    TriadsMinorHarmonic,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 4] = [
        LayoutKind::Fifths,
        LayoutKind::TriadsMajor,
        LayoutKind::TriadsMinorNatural,
        LayoutKind::TriadsMinorHarmonic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Fifths => "fifths",
            LayoutKind::TriadsMajor => "triads-major",
            LayoutKind::TriadsMinorNatural => "triads-minor-natural",
            LayoutKind::TriadsMinorHarmonic => "triads-minor-harmonic",
        }
    }

    fn scale(self) -> Option<Scale> {
        match self {
            LayoutKind::Fifths => None,
            LayoutKind::TriadsMajor => Some(Scale::Major),
            LayoutKind::TriadsMinorNatural => Some(Scale::NaturalMinor),
            LayoutKind::TriadsMinorHarmonic => Some(Scale::HarmonicMinor),
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| ChordError::UnknownLayoutKind(s.to_string()))
    }
}

/// Which circle a chord sits on in the fifths layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ring {
    Outer,
    Inner,
}

impl Ring {
    pub fn as_str(self) -> &'static str {
        match self {
            Ring::Outer => "outer",
            Ring::Inner => "inner",
        }
    }
}

/// Display position of a generated chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Position within the ring (or the degree for triad layouts).
    pub index: usize,
    pub ring: Option<Ring>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedChord {
    pub chord: Chord,
    pub placement: Placement,
}

impl PlacedChord {
    /// The musical value alone, without display data.
    pub fn detach(&self) -> Chord {
        self.chord
    }
}

/// Layout configuration: kind, root and octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSpec {
    pub kind: LayoutKind,
    pub root: PitchClass,
    pub octave: i32,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            kind: LayoutKind::Fifths,
            root: PitchClass::C,
            octave: DEFAULT_OCTAVE,
        }
    }
}

impl LayoutSpec {
    pub fn new(kind: LayoutKind, root: PitchClass, octave: i32) -> Self {
        Self { kind, root, octave }
    }

    /// Build a spec from the string selectors used by configuration surfaces.
    pub fn parse(kind: &str, root: &str, octave: i32) -> Result<Self, ChordError> {
        Ok(Self {
            kind: kind.parse()?,
            root: root.parse()?,
            octave,
        })
    }

    /// Generated chords in display order, with their placement.
    pub fn place(&self) -> Result<Vec<PlacedChord>, ChordError> {
        match self.kind.scale() {
            None => {
                let mut chords = fifths_ring(self.root, self.octave, TriadType::Major, Ring::Outer);
                chords.extend(fifths_ring(
                    self.root.transpose(INNER_RING_OFFSET),
                    self.octave,
                    TriadType::Minor,
                    Ring::Inner,
                ));
                Ok(chords)
            }
            Some(scale) => scale_triads(scale, self.root, self.octave),
        }
    }

    /// Generated chords in display order.
    pub fn generate(&self) -> Result<Vec<Chord>, ChordError> {
        Ok(self.place()?.iter().map(PlacedChord::detach).collect())
    }
}

fn fifths_ring(root: PitchClass, octave: i32, triad: TriadType, ring: Ring) -> Vec<PlacedChord> {
    (0..RING_SIZE)
        .map(|index| PlacedChord {
            chord: Chord::new(root.transpose(FIFTHS_STEP * index as i32), octave, triad),
            placement: Placement {
                index,
                ring: Some(ring),
            },
        })
        .collect()
}

fn scale_triads(scale: Scale, root: PitchClass, octave: i32) -> Result<Vec<PlacedChord>, ChordError> {
    Ok(scale
        .degree_triads()?
        .iter()
        .enumerate()
        .map(|(index, &(offset, triad))| PlacedChord {
            chord: Chord::new(root.transpose(offset as i32), octave, triad),
            placement: Placement { index, ring: None },
        })
        .collect())
}
