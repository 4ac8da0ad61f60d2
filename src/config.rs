//! Pad configuration loaded from YAML.
//!
//! ```yaml
//! channel: 0
//! velocity: 100
//! sample-rate: 44100
//! attack: 0.05
//! release: 0.05
//! waveform: sine
//! gain: 0.2
//! layout: triads-major
//! root: D
//! octave: 4
//! sample-dir: ./samples
//! ```
//!
//! Every key is optional. Missing keys take the defaults shown above, except `layout`
//! (`fifths`), `root` (`C`) and `sample-dir` (none).

use crate::error::ChordError;
use crate::layout::{LayoutKind, LayoutSpec};
use crate::output::{SynthConfig, Waveform};
use crate::player::{DEFAULT_CHANNEL, DEFAULT_VELOCITY};
use crate::theory::PitchClass;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Raw config for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    channel: Option<u8>,
    velocity: Option<u8>,
    sample_rate: Option<u32>,
    attack: Option<f32>,
    release: Option<f32>,
    waveform: Option<String>,
    gain: Option<f32>,
    layout: Option<String>,
    root: Option<String>,
    octave: Option<i32>,
    sample_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PadConfig {
    pub channel: u8,
    pub velocity: u8,
    pub synth: SynthConfig,
    pub layout: LayoutSpec,
    pub sample_dir: Option<PathBuf>,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL,
            velocity: DEFAULT_VELOCITY,
            synth: SynthConfig::default(),
            layout: LayoutSpec::default(),
            sample_dir: None,
        }
    }
}

impl PadConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChordError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ChordError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| ChordError::Config(e.to_string()))?;

        let defaults = PadConfig::default();

        let channel = raw.channel.unwrap_or(defaults.channel);
        if channel > 15 {
            return Err(ChordError::Config(format!(
                "channel must be 0-15, got {}",
                channel
            )));
        }

        let velocity = raw.velocity.unwrap_or(defaults.velocity);
        if !(1..=127).contains(&velocity) {
            return Err(ChordError::Config(format!(
                "velocity must be 1-127, got {}",
                velocity
            )));
        }

        let synth = parse_synth(&raw, defaults.synth)?;

        let kind = match &raw.layout {
            Some(kind) => kind.parse::<LayoutKind>()?,
            None => defaults.layout.kind,
        };
        let root = match &raw.root {
            Some(root) => root.parse::<PitchClass>()?,
            None => defaults.layout.root,
        };
        let octave = raw.octave.unwrap_or(defaults.layout.octave);

        Ok(PadConfig {
            channel,
            velocity,
            synth,
            layout: LayoutSpec::new(kind, root, octave),
            sample_dir: raw.sample_dir,
        })
    }
}

fn parse_synth(raw: &RawConfig, defaults: SynthConfig) -> Result<SynthConfig, ChordError> {
    let sample_rate = raw.sample_rate.unwrap_or(defaults.sample_rate);
    if sample_rate == 0 {
        return Err(ChordError::Config("sample-rate must be positive".to_string()));
    }

    let attack = raw.attack.unwrap_or(defaults.attack);
    let release = raw.release.unwrap_or(defaults.release);
    for (key, seconds) in [("attack", attack), ("release", release)] {
        if seconds.is_nan() || seconds < 0.0 {
            return Err(ChordError::Config(format!(
                "{} must be a non-negative number of seconds, got {}",
                key, seconds
            )));
        }
    }

    let waveform = match &raw.waveform {
        Some(name) => Waveform::from_name(name)
            .ok_or_else(|| ChordError::Config(format!("Invalid waveform: {}", name)))?,
        None => defaults.waveform,
    };

    let gain = raw.gain.unwrap_or(defaults.gain);
    if !(0.0..=1.0).contains(&gain) {
        return Err(ChordError::Config(format!("gain must be 0-1, got {}", gain)));
    }

    Ok(SynthConfig {
        sample_rate,
        attack,
        release,
        waveform,
        gain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(PadConfig::from_yaml("").unwrap(), PadConfig::default());
        assert_eq!(PadConfig::from_yaml("  \n").unwrap(), PadConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = PadConfig::from_yaml(
            r#"
channel: 9
velocity: 80
sample-rate: 48000
attack: 0.01
release: 0.3
waveform: saw
gain: 0.5
layout: triads-minor-harmonic
root: "F#"
octave: 3
sample-dir: /tmp/samples
"#,
        )
        .unwrap();

        assert_eq!(config.channel, 9);
        assert_eq!(config.velocity, 80);
        assert_eq!(config.synth.sample_rate, 48000);
        assert_eq!(config.synth.release, 0.3);
        assert_eq!(config.synth.waveform, Waveform::Saw);
        assert_eq!(config.layout.kind, LayoutKind::TriadsMinorHarmonic);
        assert_eq!(config.layout.root.name(), "F♯");
        assert_eq!(config.layout.octave, 3);
        assert_eq!(config.sample_dir, Some(PathBuf::from("/tmp/samples")));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = PadConfig::from_yaml("root: D\n").unwrap();
        assert_eq!(config.layout.root, PitchClass::new(2));
        assert_eq!(config.layout.kind, LayoutKind::Fifths);
        assert_eq!(config.velocity, 100);
        assert_eq!(config.synth, SynthConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            PadConfig::from_yaml("channel: 16"),
            Err(ChordError::Config(_))
        ));
        assert!(matches!(
            PadConfig::from_yaml("velocity: 0"),
            Err(ChordError::Config(_))
        ));
        assert!(matches!(
            PadConfig::from_yaml("gain: 1.5"),
            Err(ChordError::Config(_))
        ));
        assert!(matches!(
            PadConfig::from_yaml("attack: -1"),
            Err(ChordError::Config(_))
        ));
        assert!(matches!(
            PadConfig::from_yaml("waveform: noise"),
            Err(ChordError::Config(_))
        ));
        assert!(matches!(
            PadConfig::from_yaml("tempo: 120"),
            Err(ChordError::Config(_))
        ));
        assert!(matches!(
            PadConfig::from_yaml("layout: triads-minor"),
            Err(ChordError::UnknownLayoutKind(_))
        ));
        assert!(matches!(
            PadConfig::from_yaml("root: H"),
            Err(ChordError::InvalidNoteName(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "layout: triads-major\nroot: G").unwrap();

        let config = PadConfig::load(file.path()).unwrap();
        assert_eq!(config.layout.kind, LayoutKind::TriadsMajor);
        assert_eq!(config.layout.root, PitchClass::new(7));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PadConfig::load(dir.path().join("absent.yaml")),
            Err(ChordError::Io(_))
        ));
    }
}
