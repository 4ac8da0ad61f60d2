//! # Chord Lists
//!
//! Ordered chord collections (favorites, song lists) and where they are kept.
//!
//! ## Serialized Form
//! ```json
//! {"chords": [{"root": "C", "octave": 4, "type": "major"}, ...]}
//! ```
//! A document without a `chords` key is an empty list.
//!
//! ## Stores
//! - [`MemoryStore`] - in-process, for tests and short sessions
//! - [`JsonDirStore`] - one `<name>.json` file per list in a directory

use crate::chord::Chord;
use crate::error::ChordError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordList {
    #[serde(default)]
    chords: Vec<Chord>,
}

impl ChordList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a copy of `chord`.
    pub fn add(&mut self, chord: &Chord) {
        self.chords.push(*chord);
    }

    pub fn remove(&mut self, index: usize) -> Option<Chord> {
        (index < self.chords.len()).then(|| self.chords.remove(index))
    }

    /// Insert a copy of the chord at `index` right after it. Returns `false` if out of range.
    pub fn duplicate(&mut self, index: usize) -> bool {
        match self.chords.get(index).copied() {
            Some(chord) => {
                self.chords.insert(index + 1, chord);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, chord: &Chord) -> bool {
        self.chords.contains(chord)
    }

    pub fn get(&self, index: usize) -> Option<&Chord> {
        self.chords.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chord> {
        self.chords.iter()
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn to_json(&self) -> Result<String, ChordError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ChordError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<Chord> for ChordList {
    fn from_iter<I: IntoIterator<Item = Chord>>(iter: I) -> Self {
        Self {
            chords: iter.into_iter().collect(),
        }
    }
}

/// Named chord-list persistence. Loading a name never saved yields an empty list.
pub trait ChordListStore {
    fn load(&self, name: &str) -> Result<ChordList, ChordError>;

    fn save(&mut self, name: &str, list: &ChordList) -> Result<(), ChordError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChordListStore for MemoryStore {
    fn load(&self, name: &str) -> Result<ChordList, ChordError> {
        match self.lists.get(name) {
            Some(json) => ChordList::from_json(json),
            None => Ok(ChordList::new()),
        }
    }

    fn save(&mut self, name: &str, list: &ChordList) -> Result<(), ChordError> {
        self.lists.insert(name.to_string(), list.to_json()?);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> Result<PathBuf, ChordError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ChordError::Config(format!("Invalid list name: {}", name)));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }
}

impl ChordListStore for JsonDirStore {
    fn load(&self, name: &str) -> Result<ChordList, ChordError> {
        let path = self.path(name)?;
        match std::fs::read_to_string(&path) {
            Ok(json) => ChordList::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved chord list");
                Ok(ChordList::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, name: &str, list: &ChordList) -> Result<(), ChordError> {
        let path = self.path(name)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, list.to_json()?)?;
        debug!(path = %path.display(), chords = list.len(), "saved chord list");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::{PitchClass, SeventhType, TriadType};

    fn sample_list() -> ChordList {
        [
            Chord::new(PitchClass::C, 4, TriadType::Major),
            Chord::new(PitchClass::new(9), 3, TriadType::Minor).with_seventh(SeventhType::Minor),
            Chord::new(PitchClass::new(7), 4, TriadType::Major),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_list_editing() {
        let mut list = ChordList::new();
        let c = Chord::new(PitchClass::C, 4, TriadType::Major);
        list.add(&c);
        assert!(list.contains(&c));

        assert!(list.duplicate(0));
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1), Some(&c));
        assert!(!list.duplicate(5));

        assert_eq!(list.remove(0), Some(c));
        assert_eq!(list.remove(3), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_serialized_form() {
        let list: ChordList = [Chord::new(PitchClass::new(2), 4, TriadType::Minor)]
            .into_iter()
            .collect();
        assert_eq!(
            list.to_json().unwrap(),
            r#"{"chords":[{"root":"D","octave":4,"type":"minor"}]}"#
        );
    }

    #[test]
    fn test_missing_chords_key_is_empty() {
        assert!(ChordList::from_json("{}").unwrap().is_empty());
        assert!(matches!(
            ChordList::from_json("[1, 2]"),
            Err(ChordError::Serialization(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.load("favorites").unwrap().is_empty());

        store.save("favorites", &sample_list()).unwrap();
        assert_eq!(store.load("favorites").unwrap(), sample_list());
    }

    #[test]
    fn test_json_dir_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirStore::new(dir.path().join("lists"));

        assert!(store.load("song").unwrap().is_empty());
        store.save("song", &sample_list()).unwrap();
        assert!(dir.path().join("lists").join("song.json").exists());

        let reopened = JsonDirStore::new(dir.path().join("lists"));
        assert_eq!(reopened.load("song").unwrap(), sample_list());
    }

    #[test]
    fn test_json_dir_store_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirStore::new(dir.path());
        assert!(store.save("../escape", &ChordList::new()).is_err());
        assert!(store.load("").is_err());
    }
}
