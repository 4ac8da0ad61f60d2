//! # Error Types
//!
//! This module defines all error types for the chord pad core.
//!
//! ## Error Classes
//! - **Theory errors** (`InvalidNoteName`, `UnrecognizedChordShape`, `UnknownLayoutKind`)
//!   indicate broken data or configuration and are always returned to the caller.
//! - **Runtime anomalies** (`OutputUnavailable`, `LedgerUnderflow`) are expected while the
//!   pad is running. They are produced by the lower layers and recovered locally by the
//!   player and the output acquisition code (fallback or logged no-op).
//! - **Boundary errors** (`Config`, `Serialization`, `Io`) come from loading configuration
//!   files and chord lists.
//!
//! Sample loading has its own cloneable [`SampleError`] so one memoized failure can be
//! handed to every task waiting on the same sample.
//!
//! ## Usage
//! ```rust
//! use chordpad::{generate_layout, ChordError};
//!
//! match generate_layout("fifths", "C", 4) {
//!     Ok(chords) => assert_eq!(chords.len(), 24),
//!     Err(ChordError::UnknownLayoutKind(kind)) => eprintln!("no such layout: {}", kind),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChordError {
    /// A pitch name that is not in the note-name table.
    ///
    /// # Example
    /// ```
    /// # use chordpad::ChordError;
    /// let err = ChordError::InvalidNoteName("H".to_string());
    /// assert_eq!(err.to_string(), "Invalid note name: H");
    /// ```
    #[error("Invalid note name: {0}")]
    InvalidNoteName(String),

    /// An interval triple that matches none of the four triad kinds.
    ///
    /// # Example
    /// ```
    /// # use chordpad::ChordError;
    /// let err = ChordError::UnrecognizedChordShape(vec![0, 2, 7]);
    /// assert_eq!(err.to_string(), "Unrecognized chord shape: [0, 2, 7]");
    /// ```
    #[error("Unrecognized chord shape: {0:?}")]
    UnrecognizedChordShape(Vec<u8>),

    /// A layout selector outside the supported set.
    ///
    /// # Example
    /// ```
    /// # use chordpad::ChordError;
    /// let err = ChordError::UnknownLayoutKind("triads-dorian".to_string());
    /// assert_eq!(err.to_string(), "Unknown layout kind: triads-dorian");
    /// ```
    #[error("Unknown layout kind: {0}")]
    UnknownLayoutKind(String),

    /// A sound output device could not be acquired.
    ///
    /// # Example
    /// ```
    /// # use chordpad::ChordError;
    /// let err = ChordError::OutputUnavailable("no MIDI ports".to_string());
    /// assert_eq!(err.to_string(), "Sound output unavailable: no MIDI ports");
    /// ```
    #[error("Sound output unavailable: {0}")]
    OutputUnavailable(String),

    /// A release for a note that is not held.
    ///
    /// # Example
    /// ```
    /// # use chordpad::ChordError;
    /// let err = ChordError::LedgerUnderflow { note: 67 };
    /// assert_eq!(err.to_string(), "Release of note 67 without a matching hold");
    /// ```
    #[error("Release of note {note} without a matching hold")]
    LedgerUnderflow { note: u8 },

    /// Invalid configuration value.
    ///
    /// # Example
    /// ```
    /// # use chordpad::ChordError;
    /// let err = ChordError::Config("channel must be between 0 and 15".to_string());
    /// assert_eq!(err.to_string(), "Invalid config: channel must be between 0 and 15");
    /// ```
    #[error("Invalid config: {0}")]
    Config(String),

    /// A serialized chord or chord list that could not be read or written.
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ChordError {
    fn from(e: serde_json::Error) -> Self {
        ChordError::Serialization(e.to_string())
    }
}

/// Failure to fetch or decode the sample for one note.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    #[error("Sample {name} could not be fetched: {message}")]
    Fetch { name: String, message: String },

    #[error("Sample {name} could not be decoded: {message}")]
    Decode { name: String, message: String },
}
