//! Sample-based sound output.
//!
//! NOTE_ON fetches the recorded sample for the note (once per note per sampler) and starts
//! playing it as soon as it is available. Fetching runs on the tokio runtime the sampler
//! was created on, so `send` never blocks.
//!
//! ## Sample Cache
//! [`SampleCache`] memoizes one shared pending result per note number. Concurrent requests
//! for the same note wait on the single in-flight fetch and all receive the same
//! `Result`, failures included. A failed note stays failed for the lifetime of the cache.
//!
//! ## Sample Names
//! Files are named `<name><octave>` with flat spellings, e.g. note 61 is `Db4`.

use super::message::{MidiMessage, NoteEvent};
use super::SoundOutput;
use crate::error::{ChordError, SampleError};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

const SAMPLE_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// File stem of the sample for a note number (`60` -> `C4`).
pub fn sample_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", SAMPLE_NAMES[note as usize % 12], octave)
}

/// Where encoded sample bytes come from.
pub trait SampleSource: Send + Sync + 'static {
    fn fetch(&self, name: &str) -> impl Future<Output = Result<Vec<u8>, SampleError>> + Send;
}

/// Reads `<dir>/<name>.wav`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SampleSource for DirectorySource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, SampleError> {
        let path = self.dir.join(format!("{}.wav", name));
        tokio::fs::read(&path).await.map_err(|e| SampleError::Fetch {
            name: name.to_string(),
            message: format!("{}: {}", path.display(), e),
        })
    }
}

/// Decoded mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    pub sample_rate: u32,
    pub frames: Vec<f32>,
}

/// Decode WAV bytes of any bit depth, averaging channels down to mono.
pub fn decode_wav(name: &str, bytes: &[u8]) -> Result<SampleBuffer, SampleError> {
    let decode_err = |e: hound::Error| SampleError::Decode {
        name: name.to_string(),
        message: e.to_string(),
    };
    let reader = hound::WavReader::new(Cursor::new(bytes)).map_err(decode_err)?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(SampleError::Decode {
            name: name.to_string(),
            message: "sample rate is 0 Hz".to_string(),
        });
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(decode_err)?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(decode_err)?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let frames = samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();

    Ok(SampleBuffer {
        sample_rate: spec.sample_rate,
        frames,
    })
}

type SampleResult = Result<Arc<SampleBuffer>, SampleError>;

pub struct SampleCache<S> {
    source: S,
    entries: Mutex<HashMap<u8, Arc<OnceCell<SampleResult>>>>,
}

impl<S: SampleSource> SampleCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get the sample for `note`, fetching it on first use.
    pub async fn get(&self, note: u8) -> SampleResult {
        let cell = {
            let mut entries = self.entries.lock();
            Arc::clone(entries.entry(note).or_default())
        };
        cell.get_or_init(|| self.load(note)).await.clone()
    }

    /// Whether a result (success or failure) is already memoized for `note`.
    pub fn is_cached(&self, note: u8) -> bool {
        self.entries
            .lock()
            .get(&note)
            .is_some_and(|cell| cell.initialized())
    }

    async fn load(&self, note: u8) -> SampleResult {
        let name = sample_name(note);
        debug!(note, %name, "fetching sample");
        let bytes = self.source.fetch(&name).await?;
        decode_wav(&name, &bytes).map(Arc::new)
    }
}

struct SampleVoice {
    buffer: Arc<SampleBuffer>,
    position: f64,
}

#[derive(Default)]
struct SamplerState {
    /// Notes waiting for their buffer. A NOTE_OFF removes the note so it never starts.
    pending: HashSet<u8>,
    playing: HashMap<u8, SampleVoice>,
}

pub struct Sampler<S> {
    cache: Arc<SampleCache<S>>,
    state: Arc<Mutex<SamplerState>>,
    runtime: Handle,
    sample_rate: u32,
}

impl<S> Clone for Sampler<S> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            state: Arc::clone(&self.state),
            runtime: self.runtime.clone(),
            sample_rate: self.sample_rate,
        }
    }
}

impl<S: SampleSource> Sampler<S> {
    /// Create a sampler bound to the current tokio runtime.
    pub fn new(source: S, sample_rate: u32) -> Result<Self, ChordError> {
        let runtime = Handle::try_current()
            .map_err(|e| ChordError::OutputUnavailable(format!("sampler needs a runtime: {}", e)))?;
        Ok(Self {
            cache: Arc::new(SampleCache::new(source)),
            state: Arc::new(Mutex::new(SamplerState::default())),
            runtime,
            sample_rate,
        })
    }

    pub fn cache(&self) -> &SampleCache<S> {
        &self.cache
    }

    /// Notes whose sample is currently playing.
    pub fn playing_notes(&self) -> Vec<u8> {
        let mut notes: Vec<u8> = self.state.lock().playing.keys().copied().collect();
        notes.sort_unstable();
        notes
    }

    pub fn is_pending(&self, note: u8) -> bool {
        self.state.lock().pending.contains(&note)
    }

    fn note_on(&self, note: u8) {
        {
            let mut state = self.state.lock();
            if state.playing.contains_key(&note) || !state.pending.insert(note) {
                return;
            }
        }

        let cache = Arc::clone(&self.cache);
        let state = Arc::clone(&self.state);
        self.runtime.spawn(async move {
            let result = cache.get(note).await;
            let mut state = state.lock();
            if !state.pending.remove(&note) {
                return;
            }
            match result {
                Ok(buffer) => {
                    state.playing.insert(
                        note,
                        SampleVoice {
                            buffer,
                            position: 0.0,
                        },
                    );
                }
                Err(e) => warn!(note, error = %e, "sample unavailable"),
            }
        });
    }

    fn note_off(&self, note: u8) {
        let mut state = self.state.lock();
        state.pending.remove(&note);
        state.playing.remove(&note);
    }

    /// Overwrite `out` with the next block of mono samples, dropping finished voices.
    pub fn render(&self, out: &mut [f32]) {
        out.fill(0.0);
        let mut state = self.state.lock();
        for voice in state.playing.values_mut() {
            let step = voice.buffer.sample_rate as f64 / self.sample_rate as f64;
            for sample in out.iter_mut() {
                let Some(&value) = voice.buffer.frames.get(voice.position as usize) else {
                    break;
                };
                *sample += value;
                voice.position += step;
            }
        }
        state
            .playing
            .retain(|_, voice| (voice.position as usize) < voice.buffer.frames.len());
    }
}

impl<S: SampleSource> SoundOutput for Sampler<S> {
    fn name(&self) -> &str {
        "sampler"
    }

    fn send(&mut self, message: MidiMessage) {
        match message.event() {
            NoteEvent::On { note, .. } => self.note_on(note),
            NoteEvent::Off { note } => self.note_off(note),
            NoteEvent::Other => {}
        }
    }
}
