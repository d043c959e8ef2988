//! ms-cli: inspect, render and play MOD files.
//!
//! Usage:
//!   ms-cli info song.mod
//!   ms-cli render song.mod out.wav --mix hard
//!   ms-cli play song.mod --loop

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ms_engine::{encode_pcm, ByteOrder, MixMode, PlayerConfig};
use ms_master::{Controller, RenderSettings};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "ms-cli")]
#[command(about = "Four-channel MOD player")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log unsupported effects and playback details
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print module header, instruments and sequence
    Info {
        /// Path to the MOD file
        file: PathBuf,
    },

    /// Render to a raw PCM or WAV file
    Render {
        /// Path to the MOD file
        file: PathBuf,

        /// Output file
        output: PathBuf,

        /// Output container (default: from the output extension)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        #[command(flatten)]
        playback: PlaybackArgs,
    },

    /// Play on the default audio device
    Play {
        /// Path to the MOD file
        file: PathBuf,

        #[command(flatten)]
        playback: PlaybackArgs,
    },
}

#[derive(Args)]
struct PlaybackArgs {
    /// Channel mix: mono, soft or hard
    #[arg(long, default_value = "soft")]
    mix: MixMode,

    /// Output sample rate in Hz (render only; playback uses the device rate)
    #[arg(long, default_value_t = 44100)]
    rate: u32,

    /// Wrap to the start instead of stopping at the song end
    #[arg(long = "loop")]
    looping: bool,

    /// Ignore set-tempo effects
    #[arg(long)]
    no_tempo: bool,

    /// First sequence position
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Stop after this many seconds
    #[arg(long, default_value_t = 300)]
    max_seconds: u32,
}

impl PlaybackArgs {
    fn settings(&self) -> RenderSettings {
        RenderSettings {
            config: PlayerConfig {
                sample_rate: self.rate,
                looping: self.looping,
                support_tempo: !self.no_tempo,
            },
            mix: self.mix,
            start: self.start,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Headerless signed 16-bit little-endian
    Raw,
    Wav,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { file } => info(&load(&file)?),
        Commands::Render {
            file,
            output,
            format,
            playback,
        } => render(&load(&file)?, &output, format, &playback),
        Commands::Play { file, playback } => play(&mut load(&file)?, &playback),
    }
}

fn load(path: &Path) -> Result<Controller> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Controller::load(data).with_context(|| format!("failed to parse {}", path.display()))
}

fn info(ctrl: &Controller) -> Result<()> {
    let module = ctrl.module()?;
    println!("Title:       {}", module.title());
    println!("Format:      {:?}", module.format());
    println!("Length:      {}", module.sequence_length());
    println!("Patterns:    {}", module.pattern_count());
    println!("Sample data: offset 0x{:x}", module.sample_offset());
    println!();

    println!(" #  {:<22} {:>6} {:>3}  loop", "name", "bytes", "vol");
    for (i, inst) in module.instruments().iter().enumerate() {
        if inst.is_empty() && inst.name().is_empty() {
            continue;
        }
        let looped = match inst.loop_range() {
            Some(range) => format!("{}..{}", range.start, range.end),
            None => "-".into(),
        };
        println!(
            "{:2}  {:<22} {:>6} {:>3}  {}",
            i + 1,
            inst.name(),
            inst.len(),
            inst.default_volume(),
            looped
        );
    }
    println!();

    let sequence: Vec<String> = module.sequence().iter().map(|p| format!("{p:02}")).collect();
    println!("Sequence: {}", sequence.join(" "));
    Ok(())
}

fn render(
    ctrl: &Controller,
    output: &Path,
    format: Option<OutputFormat>,
    args: &PlaybackArgs,
) -> Result<()> {
    let format = match format {
        Some(format) => format,
        None => match output.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("wav") => OutputFormat::Wav,
            Some(ext) if ext.eq_ignore_ascii_case("raw") || ext.eq_ignore_ascii_case("pcm") => {
                OutputFormat::Raw
            }
            _ => bail!(
                "cannot infer output format from {}; pass --format",
                output.display()
            ),
        },
    };

    let settings = args.settings();
    let started = Instant::now();
    let bytes = match format {
        OutputFormat::Wav => ctrl.render_to_wav(settings, args.max_seconds)?,
        OutputFormat::Raw => {
            let max_frames = args.rate as usize * args.max_seconds as usize;
            let samples = ctrl.render_with(settings, max_frames)?;
            let mut bytes = vec![0u8; samples.len() * 2];
            encode_pcm(&samples, ByteOrder::Little, &mut bytes);
            bytes
        }
    };

    std::fs::write(output, &bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(
        path = %output.display(),
        bytes = bytes.len(),
        rate = args.rate,
        channels = args.mix.channels(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rendered"
    );
    Ok(())
}

fn play(ctrl: &mut Controller, args: &PlaybackArgs) -> Result<()> {
    ctrl.play(args.settings());
    let deadline = Instant::now() + Duration::from_secs(args.max_seconds as u64);

    while ctrl.is_playing() {
        if Instant::now() >= deadline {
            ctrl.stop();
            break;
        }
        if let Some(pos) = ctrl.position() {
            print!(
                "\rPos: {:02X} | Pat: {:02X} | Row: {:02X}",
                pos.sequence, pos.pattern, pos.row
            );
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    println!("\rDone.                          ");
    Ok(())
}
