use chordpad::output::{DirectorySource, MessageLog, Sampler, Synth};
use chordpad::{
    ChordError, ChordList, ChordPad, LayoutKind, LayoutSpec, NotePlayer, PadConfig, PitchClass,
    Ring,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "chordpad", version, about = "Generate and play chord pad layouts")]
struct Cli {
    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the chords of a layout
    Layout {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Print the serialized chord list instead of labels
        #[arg(long)]
        json: bool,
    },
    /// Press and release every slot, printing the MIDI messages sent
    Play {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Also send to every connected MIDI output
        #[arg(long)]
        devices: bool,
    },
    /// Render every chord in turn to a 16-bit mono WAV file
    Render {
        #[command(flatten)]
        layout: LayoutArgs,

        #[arg(long)]
        out: PathBuf,

        /// How long each chord is held
        #[arg(long, default_value_t = 500)]
        hold_ms: u32,

        /// Directory of `<note>.wav` samples to mix in (overrides `sample-dir`)
        #[arg(long)]
        samples: Option<PathBuf>,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// fifths, triads-major, triads-minor-natural or triads-minor-harmonic
    kind: Option<String>,

    #[arg(long)]
    root: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    octave: Option<i32>,
}

impl LayoutArgs {
    /// Command-line values over config values.
    fn resolve(&self, config: &PadConfig) -> Result<LayoutSpec, ChordError> {
        let mut spec = config.layout;
        if let Some(kind) = &self.kind {
            spec.kind = kind.parse::<LayoutKind>()?;
        }
        if let Some(root) = &self.root {
            spec.root = root.parse::<PitchClass>()?;
        }
        if let Some(octave) = self.octave {
            spec.octave = octave;
        }
        Ok(spec)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("chordpad=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ChordError> {
    let config = match &cli.config {
        Some(path) => PadConfig::load(path)?,
        None => PadConfig::default(),
    };

    match cli.command {
        Command::Layout { layout, json } => print_layout(layout.resolve(&config)?, json),
        Command::Play { layout, devices } => play(&config, layout.resolve(&config)?, devices),
        Command::Render {
            layout,
            out,
            hold_ms,
            samples,
        } => {
            let spec = layout.resolve(&config)?;
            let sample_dir = samples.or_else(|| config.sample_dir.clone());
            render(&config, spec, &out, hold_ms, sample_dir.as_deref())
        }
    }
}

fn print_layout(spec: LayoutSpec, json: bool) -> Result<(), ChordError> {
    let placed = spec.place()?;

    if json {
        let list: ChordList = placed.iter().map(|p| p.detach()).collect();
        println!("{}", list.to_json()?);
        return Ok(());
    }

    for slot in &placed {
        let ring = slot.placement.ring.map_or("degree", Ring::as_str);
        println!(
            "{:>6} {:>2}  {:<6} {:?}",
            ring,
            slot.placement.index,
            slot.chord.to_string(),
            slot.chord.notes()
        );
    }
    Ok(())
}

fn play(config: &PadConfig, spec: LayoutSpec, devices: bool) -> Result<(), ChordError> {
    let log = MessageLog::new();
    let player =
        NotePlayer::new(Box::new(log.clone())).with_settings(config.channel, config.velocity)?;
    let mut pad = ChordPad::with_player(spec, player)?;

    if devices {
        let connected = pad.connect_devices();
        info!(connected, "MIDI outputs");
    }

    for slot in 0..pad.slots().len() {
        let Some(chord) = pad.press(slot) else {
            continue;
        };
        pad.release(slot);
        for message in log.take() {
            let [status, note, velocity] = message.to_bytes();
            println!("{:<6} {:02X} {:3} {:3}", chord.to_string(), status, note, velocity);
        }
    }
    Ok(())
}

fn render(
    config: &PadConfig,
    spec: LayoutSpec,
    out: &Path,
    hold_ms: u32,
    sample_dir: Option<&Path>,
) -> Result<(), ChordError> {
    let sample_rate = config.synth.sample_rate;
    let synth = Synth::new(config.synth);
    let mut player = NotePlayer::new(Box::new(synth.clone()))
        .with_settings(config.channel, config.velocity)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    let sampler = match sample_dir {
        Some(dir) => {
            let sampler = Sampler::new(DirectorySource::new(dir), sample_rate)?;
            player.add_output(Box::new(sampler.clone()));
            Some(sampler)
        }
        None => None,
    };

    let chords = spec.generate()?;
    let hold_frames = (hold_ms as u64 * sample_rate as u64 / 1000) as usize;
    let tail_frames = (config.synth.release * sample_rate as f32).ceil() as usize;

    let wav_spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(out, wav_spec).map_err(wav_error)?;

    let mut block = vec![0.0f32; hold_frames];
    let mut layer = vec![0.0f32; hold_frames];
    for chord in &chords {
        player.play(chord);
        if let Some(sampler) = &sampler {
            // Let the spawned loads settle so the sample starts with the chord.
            runtime.block_on(async {
                while chord
                    .notes()
                    .iter()
                    .any(|&n| u8::try_from(n).is_ok_and(|n| sampler.is_pending(n)))
                {
                    tokio::task::yield_now().await;
                }
            });
        }

        mix(&synth, sampler.as_ref(), &mut block, &mut layer);
        write_block(&mut writer, &block)?;
        player.stop(chord);
    }

    block.resize(tail_frames, 0.0);
    layer.resize(tail_frames, 0.0);
    mix(&synth, sampler.as_ref(), &mut block, &mut layer);
    write_block(&mut writer, &block)?;

    writer.finalize().map_err(wav_error)?;
    info!(path = %out.display(), chords = chords.len(), "rendered layout");
    Ok(())
}

fn mix(
    synth: &Synth,
    sampler: Option<&Sampler<DirectorySource>>,
    block: &mut [f32],
    layer: &mut [f32],
) {
    synth.render(block);
    if let Some(sampler) = sampler {
        sampler.render(layer);
        for (out, sample) in block.iter_mut().zip(layer.iter()) {
            *out += sample;
        }
    }
}

fn write_block<W: std::io::Write + std::io::Seek>(
    writer: &mut hound::WavWriter<W>,
    block: &[f32],
) -> Result<(), ChordError> {
    for &sample in block {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value).map_err(wav_error)?;
    }
    Ok(())
}

fn wav_error(e: hound::Error) -> ChordError {
    match e {
        hound::Error::IoError(e) => ChordError::Io(e),
        other => ChordError::OutputUnavailable(other.to_string()),
    }
}
