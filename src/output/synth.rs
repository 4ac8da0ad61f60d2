//! Built-in software synthesizer.
//!
//! One oscillator voice per sounding note, shaped by a linear attack ramp on NOTE_ON and a
//! linear release ramp on NOTE_OFF. The synth renders mono `f32` samples into caller
//! buffers; wiring it to an audio device is up to the host. `Synth` is a cheap cloneable
//! handle, so the player can own one clone while the audio callback renders from another.

use super::message::{MidiMessage, NoteEvent};
use super::SoundOutput;
use parking_lot::Mutex;
use std::f32::consts::TAU;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Saw,
    Square,
}

impl Waveform {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sine" => Some(Waveform::Sine),
            "triangle" => Some(Waveform::Triangle),
            "saw" => Some(Waveform::Saw),
            "square" => Some(Waveform::Square),
            _ => None,
        }
    }

    /// One sample at `phase` in `[0, 1)`.
    fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    -4.0 * phase + 3.0
                }
            }
            Waveform::Saw => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// Synth settings. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: u32,
    pub attack: f32,
    pub release: f32,
    pub waveform: Waveform,
    /// Per-voice output level.
    pub gain: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            attack: 0.05,
            release: 0.05,
            waveform: Waveform::Sine,
            gain: 0.2,
        }
    }
}

pub fn note_to_frequency(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum VoiceState {
    Attack,
    Sustain,
    Release,
    Idle,
}

#[derive(Debug, Clone)]
struct Voice {
    note: u8,
    velocity: f32,
    frequency: f32,
    phase: f32,
    state: VoiceState,
    level: f32,
    /// Level when the release started, so a release during attack ramps down from there.
    release_from: f32,
    time_in_state: f32, // samples
}

impl Voice {
    fn new(note: u8, velocity: u8) -> Self {
        Self {
            note,
            velocity: velocity as f32 / 127.0,
            frequency: note_to_frequency(note),
            phase: 0.0,
            state: VoiceState::Attack,
            level: 0.0,
            release_from: 0.0,
            time_in_state: 0.0,
        }
    }

    fn is_idle(&self) -> bool {
        self.state == VoiceState::Idle
    }

    fn is_held(&self) -> bool {
        matches!(self.state, VoiceState::Attack | VoiceState::Sustain)
    }

    fn release(&mut self) {
        if self.is_held() {
            self.release_from = self.level;
            self.state = VoiceState::Release;
            self.time_in_state = 0.0;
        }
    }

    fn process(&mut self, config: &SynthConfig) -> f32 {
        let sample_rate = config.sample_rate as f32;
        let attack_samples = config.attack * sample_rate;
        let release_samples = config.release * sample_rate;

        match self.state {
            VoiceState::Attack => {
                if self.time_in_state < attack_samples {
                    self.level = self.time_in_state / attack_samples;
                } else {
                    self.state = VoiceState::Sustain;
                    self.level = 1.0;
                }
            }
            VoiceState::Sustain => self.level = 1.0,
            VoiceState::Release => {
                if self.time_in_state < release_samples {
                    self.level = self.release_from * (1.0 - self.time_in_state / release_samples);
                } else {
                    self.state = VoiceState::Idle;
                    self.level = 0.0;
                }
            }
            VoiceState::Idle => self.level = 0.0,
        }
        self.time_in_state += 1.0;

        let value = config.waveform.sample(self.phase);
        self.phase += self.frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        value * self.level * self.velocity * config.gain
    }
}

#[derive(Clone)]
pub struct Synth {
    config: SynthConfig,
    voices: Arc<Mutex<Vec<Voice>>>,
}

impl Synth {
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            voices: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn note_on(&self, note: u8, velocity: u8) {
        let mut voices = self.voices.lock();
        if voices.iter().any(|v| v.note == note && v.is_held()) {
            return;
        }
        voices.push(Voice::new(note, velocity));
    }

    pub fn note_off(&self, note: u8) {
        for voice in self.voices.lock().iter_mut().filter(|v| v.note == note) {
            voice.release();
        }
    }

    /// Notes that are held (not releasing or finished).
    pub fn held_notes(&self) -> Vec<u8> {
        self.voices
            .lock()
            .iter()
            .filter(|v| v.is_held())
            .map(|v| v.note)
            .collect()
    }

    /// Number of voices still producing sound, releasing ones included.
    pub fn active_voices(&self) -> usize {
        self.voices.lock().iter().filter(|v| !v.is_idle()).count()
    }

    /// Overwrite `out` with the next block of mono samples.
    pub fn render(&self, out: &mut [f32]) {
        let mut voices = self.voices.lock();
        for sample in out.iter_mut() {
            *sample = voices
                .iter_mut()
                .map(|voice| voice.process(&self.config))
                .sum();
        }
        voices.retain(|v| !v.is_idle());
    }
}

impl SoundOutput for Synth {
    fn name(&self) -> &str {
        "synth"
    }

    fn send(&mut self, message: MidiMessage) {
        match message.event() {
            NoteEvent::On { note, velocity } => self.note_on(note, velocity),
            NoteEvent::Off { note } => self.note_off(note),
            NoteEvent::Other => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth() -> Synth {
        Synth::new(SynthConfig {
            sample_rate: 1000,
            attack: 0.01,
            release: 0.01,
            waveform: Waveform::Square,
            gain: 1.0,
        })
    }

    #[test]
    fn test_frequency() {
        assert!((note_to_frequency(69) - 440.0).abs() < 1e-3);
        assert!((note_to_frequency(81) - 880.0).abs() < 1e-2);
        assert!((note_to_frequency(60) - 261.63).abs() < 1e-2);
    }

    #[test]
    fn test_attack_ramps_up() {
        let mut synth = synth();
        synth.send(MidiMessage::note_on(0, 60, 127));
        let mut block = [0.0f32; 20];
        synth.render(&mut block);
        assert_eq!(block[0], 0.0);
        assert!(block[5].abs() < block[15].abs());
        assert!((block[15].abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_release_finishes_voice() {
        let mut synth = synth();
        synth.send(MidiMessage::note_on(0, 60, 127));
        let mut block = [0.0f32; 20];
        synth.render(&mut block);
        assert_eq!(synth.held_notes(), vec![60]);

        synth.send(MidiMessage::note_off(0, 60, 100));
        assert!(synth.held_notes().is_empty());
        assert_eq!(synth.active_voices(), 1);

        synth.render(&mut block);
        assert_eq!(synth.active_voices(), 0);
        assert_eq!(block[19], 0.0);
    }

    #[test]
    fn test_velocity_zero_is_note_off() {
        let mut synth = synth();
        synth.send(MidiMessage::note_on(0, 64, 100));
        synth.send(MidiMessage::note_on(0, 64, 0));
        assert!(synth.held_notes().is_empty());
    }

    #[test]
    fn test_clones_share_voices() {
        let mut player_side = synth();
        let render_side = player_side.clone();
        player_side.send(MidiMessage::note_on(0, 67, 100));
        assert_eq!(render_side.held_notes(), vec![67]);
    }

    #[test]
    fn test_retrigger_ignored_while_held() {
        let mut synth = synth();
        synth.send(MidiMessage::note_on(0, 64, 100));
        synth.send(MidiMessage::note_on(0, 64, 100));
        assert_eq!(synth.active_voices(), 1);
    }
}
