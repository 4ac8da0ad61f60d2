//! Hardware MIDI outputs through the platform MIDI API (`midir`).

use super::message::MidiMessage;
use super::SoundOutput;
use crate::error::ChordError;
use midir::{MidiOutput, MidiOutputConnection};
use tracing::{info, warn};

const CLIENT_NAME: &str = "chordpad";

pub struct MidiDevice {
    name: String,
    connection: MidiOutputConnection,
}

impl MidiDevice {
    /// Connect every available MIDI output port.
    ///
    /// Fails with `OutputUnavailable` when the MIDI API cannot be initialized or no port
    /// accepts a connection.
    pub fn connect_all() -> Result<Vec<MidiDevice>, ChordError> {
        let probe = MidiOutput::new(CLIENT_NAME).map_err(unavailable)?;
        let port_count = probe.ports().len();
        drop(probe);

        let mut devices = Vec::with_capacity(port_count);
        for index in 0..port_count {
            match Self::connect(index) {
                Ok(device) => {
                    info!(device = %device.name, "connected MIDI output");
                    devices.push(device);
                }
                Err(e) => warn!(port = index, error = %e, "skipping MIDI output"),
            }
        }

        if devices.is_empty() {
            return Err(ChordError::OutputUnavailable(
                "no MIDI output ports".to_string(),
            ));
        }
        Ok(devices)
    }

    fn connect(index: usize) -> Result<MidiDevice, ChordError> {
        // `connect` consumes the client, so each port gets its own.
        let output = MidiOutput::new(CLIENT_NAME).map_err(unavailable)?;
        let ports = output.ports();
        let port = ports.get(index).ok_or_else(|| {
            ChordError::OutputUnavailable(format!("MIDI output {} disappeared", index))
        })?;
        let name = output.port_name(port).map_err(unavailable)?;
        let connection = output
            .connect(port, CLIENT_NAME)
            .map_err(|e| ChordError::OutputUnavailable(e.to_string()))?;
        Ok(MidiDevice { name, connection })
    }
}

fn unavailable(e: impl std::fmt::Display) -> ChordError {
    ChordError::OutputUnavailable(e.to_string())
}

impl SoundOutput for MidiDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, message: MidiMessage) {
        if let Err(e) = self.connection.send(&message.to_bytes()) {
            warn!(device = %self.name, error = %e, "MIDI send failed");
        }
    }
}
