//! # Chord Pad
//!
//! Application state behind a chord pad surface: the layout settings, the chords they
//! generate, and which chords are currently held.
//!
//! ## State Flow
//! - Setters (`set_kind`, `set_root`, `set_octave`) validate and store a value, then
//!   [`ChordPad::recompute`] regenerates the slots from scratch
//! - `press(slot)` plays the slot's chord and records a hold under that slot
//! - `release(slot)` stops exactly the chord recorded at press time, so a layout change
//!   while a pad is down cannot strand a note
//!
//! Pointer-up and pointer-leave both map to `release`; whichever arrives second finds no
//! hold and does nothing.

use crate::chord::Chord;
use crate::error::ChordError;
use crate::layout::{LayoutKind, LayoutSpec, PlacedChord};
use crate::output::{DeviceAccess, SoundOutput};
use crate::player::NotePlayer;
use crate::theory::PitchClass;
use std::collections::HashMap;
use tracing::{debug, info};

/// What a hold is keyed by: a layout slot, or a chord outside the layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HoldId {
    Slot(usize),
    External(String),
}

pub struct ChordPad {
    spec: LayoutSpec,
    slots: Vec<PlacedChord>,
    player: NotePlayer,
    holds: HashMap<HoldId, Chord>,
    devices: DeviceAccess,
}

impl ChordPad {
    /// Pad with the given layout, playing through `primary`. External devices are requested
    /// through `DeviceAccess::system()` when [`ChordPad::connect_devices`] is called.
    pub fn new(spec: LayoutSpec, primary: Box<dyn SoundOutput>) -> Result<Self, ChordError> {
        Self::with_player(spec, NotePlayer::new(primary))
    }

    pub fn with_player(spec: LayoutSpec, player: NotePlayer) -> Result<Self, ChordError> {
        let slots = spec.place()?;
        Ok(Self {
            spec,
            slots,
            player,
            holds: HashMap::new(),
            devices: DeviceAccess::system(),
        })
    }

    pub fn with_devices(mut self, devices: DeviceAccess) -> Self {
        self.devices = devices;
        self
    }

    pub fn spec(&self) -> LayoutSpec {
        self.spec
    }

    pub fn slots(&self) -> &[PlacedChord] {
        &self.slots
    }

    pub fn chord_at(&self, slot: usize) -> Option<Chord> {
        self.slots.get(slot).map(PlacedChord::detach)
    }

    pub fn player(&self) -> &NotePlayer {
        &self.player
    }

    pub fn set_kind(&mut self, kind: LayoutKind) -> Result<(), ChordError> {
        self.spec.kind = kind;
        self.recompute()
    }

    /// Set the root from a pitch name (`"D"`, `"F♯"`, `"Bb"`).
    pub fn set_root(&mut self, root: &str) -> Result<(), ChordError> {
        let root: PitchClass = root.parse()?;
        self.spec.root = root;
        self.recompute()
    }

    pub fn set_octave(&mut self, octave: i32) -> Result<(), ChordError> {
        self.spec.octave = octave;
        self.recompute()
    }

    /// Regenerate the slots from the current settings. Held chords keep sounding.
    pub fn recompute(&mut self) -> Result<(), ChordError> {
        self.slots = self.spec.place()?;
        debug!(
            kind = %self.spec.kind,
            root = %self.spec.root,
            octave = self.spec.octave,
            slots = self.slots.len(),
            "recomputed layout"
        );
        Ok(())
    }

    /// Play the chord at `slot`. Returns the chord, or `None` for an unknown or already held
    /// slot.
    pub fn press(&mut self, slot: usize) -> Option<Chord> {
        let chord = self.chord_at(slot)?;
        self.hold(HoldId::Slot(slot), chord).then_some(chord)
    }

    /// Stop the chord pressed at `slot`. Returns `false` if the slot was not held.
    pub fn release(&mut self, slot: usize) -> bool {
        self.unhold(&HoldId::Slot(slot))
    }

    /// Play a chord that is not part of the layout, such as a favorite.
    pub fn press_chord(&mut self, id: &str, chord: &Chord) -> bool {
        self.hold(HoldId::External(id.to_string()), *chord)
    }

    pub fn release_chord(&mut self, id: &str) -> bool {
        self.unhold(&HoldId::External(id.to_string()))
    }

    pub fn is_held(&self, id: &HoldId) -> bool {
        self.holds.contains_key(id)
    }

    /// Release every hold, e.g. when the surface loses focus.
    pub fn release_all(&mut self) {
        for (_, chord) in self.holds.drain() {
            self.player.stop(&chord);
        }
    }

    /// Request external outputs once and add them after the built-in ones.
    /// Returns how many were added.
    pub fn connect_devices(&mut self) -> usize {
        let outputs = self.devices.acquire();
        let count = outputs.len();
        for output in outputs {
            info!(output = output.name(), "adding external output");
            self.player.add_output(output);
        }
        count
    }

    fn hold(&mut self, id: HoldId, chord: Chord) -> bool {
        if self.holds.contains_key(&id) {
            return false;
        }
        self.player.play(&chord);
        self.holds.insert(id, chord);
        true
    }

    fn unhold(&mut self, id: &HoldId) -> bool {
        match self.holds.remove(id) {
            Some(chord) => {
                self.player.stop(&chord);
                true
            }
            None => false,
        }
    }
}
