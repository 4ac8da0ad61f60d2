//! # Sound Outputs
//!
//! Anything that accepts NOTE_ON/NOTE_OFF messages from the note player.
//!
//! ## Sub-modules
//! - `message` - 3-byte [`MidiMessage`] and its note-level interpretation
//! - `synth` - built-in oscillator synthesizer with attack/release ramps
//! - `sampler` - sample player with a per-note memoizing [`SampleCache`]
//! - `device` - hardware MIDI outputs (feature `midi-device`)
//!
//! ## Contract
//! `send` is fire-and-forget: it must not block and has no error channel. Outputs that can
//! fail at runtime (a disconnected device, a missing sample) log the failure and carry on.
//!
//! ## Device Acquisition
//! [`DeviceAccess`] requests external devices at most once per session. Failure only means
//! the player keeps running on its built-in synth.

mod message;
mod sampler;
mod synth;

#[cfg(feature = "midi-device")]
mod device;

pub use message::{MidiMessage, NoteEvent, NOTE_OFF, NOTE_ON};
pub use sampler::{
    decode_wav, sample_name, DirectorySource, SampleBuffer, SampleCache, SampleSource, Sampler,
};
pub use synth::{note_to_frequency, Synth, SynthConfig, Waveform};

#[cfg(feature = "midi-device")]
pub use device::MidiDevice;

use crate::error::ChordError;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

pub trait SoundOutput: Send {
    fn name(&self) -> &str;

    fn send(&mut self, message: MidiMessage);
}

/// Output that records every message it receives. Clones share one log.
#[derive(Clone, Default)]
pub struct MessageLog {
    messages: Arc<Mutex<Vec<MidiMessage>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<MidiMessage> {
        self.messages.lock().clone()
    }

    /// Return and clear the recorded messages.
    pub fn take(&self) -> Vec<MidiMessage> {
        std::mem::take(&mut *self.messages.lock())
    }
}

impl SoundOutput for MessageLog {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&mut self, message: MidiMessage) {
        self.messages.lock().push(message);
    }
}

type DeviceRequest = Box<dyn FnOnce() -> Result<Vec<Box<dyn SoundOutput>>, ChordError> + Send>;

/// One-shot access to external sound outputs.
pub struct DeviceAccess {
    request: Option<DeviceRequest>,
}

impl DeviceAccess {
    /// Access to the platform's MIDI outputs.
    pub fn system() -> Self {
        Self::with_request(request_system_devices)
    }

    pub fn with_request(
        request: impl FnOnce() -> Result<Vec<Box<dyn SoundOutput>>, ChordError> + Send + 'static,
    ) -> Self {
        Self {
            request: Some(Box::new(request)),
        }
    }

    pub fn is_requested(&self) -> bool {
        self.request.is_none()
    }

    /// Run the request the first time; every later call yields no outputs.
    /// A failed request is logged and also yields no outputs.
    pub fn acquire(&mut self) -> Vec<Box<dyn SoundOutput>> {
        let Some(request) = self.request.take() else {
            return Vec::new();
        };
        match request() {
            Ok(outputs) => {
                info!(count = outputs.len(), "acquired external sound outputs");
                outputs
            }
            Err(e) => {
                warn!(error = %e, "external sound outputs unavailable, using built-in synth only");
                Vec::new()
            }
        }
    }
}

#[cfg(feature = "midi-device")]
fn request_system_devices() -> Result<Vec<Box<dyn SoundOutput>>, ChordError> {
    Ok(MidiDevice::connect_all()?
        .into_iter()
        .map(|device| Box::new(device) as Box<dyn SoundOutput>)
        .collect())
}

#[cfg(not(feature = "midi-device"))]
fn request_system_devices() -> Result<Vec<Box<dyn SoundOutput>>, ChordError> {
    Err(ChordError::OutputUnavailable(
        "built without MIDI device support".to_string(),
    ))
}
