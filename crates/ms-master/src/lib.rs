//! Headless controller for modstream.
//!
//! Owns a module's bytes and drives the engine for offline rendering
//! (PCM or WAV) and for live playback on a background thread.

mod wav;

use ms_audio::{AudioError, AudioOutput, CpalOutput};
use ms_engine::{frames, Frame, MixMode, Player, PlayerConfig};
use ms_format::Module;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

pub use ms_engine::PlaybackPosition;
pub use ms_format::FormatError;

pub use wav::{samples_to_wav, write_wav};

/// Frames rendered per engine call.
const BLOCK_FRAMES: usize = 1024;

/// Where rendering starts and how it is mixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSettings {
    pub config: PlayerConfig,
    pub mix: MixMode,
    /// First sequence position
    pub start: usize,
}

/// Headless player controller.
pub struct Controller {
    data: Arc<[u8]>,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    position: Arc<AtomicU32>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Controller {
    /// Take ownership of module bytes, rejecting malformed modules.
    pub fn load(data: Vec<u8>) -> Result<Self, FormatError> {
        {
            let module = Module::decode(&data)?;
            tracing::debug!(
                title = %module.title(),
                format = ?module.format(),
                length = module.sequence_length(),
                patterns = module.pattern_count(),
                "loaded module"
            );
        }
        Ok(Self {
            data: data.into(),
            playback: None,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The decoded module.
    pub fn module(&self) -> Result<Module<'_>, FormatError> {
        Module::decode(&self.data)
    }

    // --- Offline rendering ---

    /// Render from the start until the song finishes or `max_frames`
    /// frames have been produced. Interleaved, `mix.channels()` samples
    /// per frame.
    pub fn render_pcm(
        &self,
        config: PlayerConfig,
        mix: MixMode,
        max_frames: usize,
    ) -> Result<Vec<i16>, FormatError> {
        self.render_with(
            RenderSettings {
                config,
                mix,
                start: 0,
            },
            max_frames,
        )
    }

    /// Like [`Controller::render_pcm`], from an arbitrary position. The
    /// block in which the song ends is kept whole, so the tail of the last
    /// notes is included.
    pub fn render_with(
        &self,
        settings: RenderSettings,
        max_frames: usize,
    ) -> Result<Vec<i16>, FormatError> {
        let mut player = Player::with_config(self.module()?, settings.config);
        player.set_sequence_position(settings.start);

        let channels = settings.mix.channels();
        let mut out = Vec::with_capacity(max_frames.min(BLOCK_FRAMES * 64) * channels);
        let mut block = [0i16; BLOCK_FRAMES * 2];

        while out.len() < max_frames * channels {
            let frames = (max_frames - out.len() / channels).min(BLOCK_FRAMES);
            let buf = &mut block[..frames * channels];
            let more = player.render(buf, settings.mix);
            out.extend_from_slice(buf);
            if !more {
                tracing::debug!(frames = out.len() / channels, "song finished");
                break;
            }
        }
        Ok(out)
    }

    /// Render to an in-memory WAV file, capped at `max_seconds`.
    pub fn render_to_wav(
        &self,
        settings: RenderSettings,
        max_seconds: u32,
    ) -> Result<Vec<u8>, FormatError> {
        let rate = settings.config.sample_rate.max(1);
        let max_frames = rate as usize * max_seconds as usize;
        let samples = self.render_with(settings, max_frames)?;
        Ok(samples_to_wav(
            &samples,
            settings.mix.channels() as u16,
            rate,
        ))
    }

    // --- Real-time playback ---

    /// Play on the default audio device. The device rate overrides
    /// `settings.config.sample_rate`.
    pub fn play(&mut self, settings: RenderSettings) {
        self.stop();

        let data = self.data.clone();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let position = Arc::new(AtomicU32::new(0));
        let finished = Arc::new(AtomicBool::new(false));

        let stop = stop_signal.clone();
        let pos = position.clone();
        let done = finished.clone();

        let thread = std::thread::spawn(move || {
            if let Err(err) = audio_thread(&data, settings, &stop, &pos) {
                tracing::error!(%err, "playback failed");
            }
            done.store(true, Ordering::Relaxed);
        });

        self.playback = Some(PlaybackHandle {
            stop_signal,
            position,
            finished,
            thread: Some(thread),
        });
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                let _ = handle.join();
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    /// Live playback position, sampled once per rendered block.
    pub fn position(&self) -> Option<PlaybackPosition> {
        let pb = self.playback.as_ref()?;
        if pb.finished.load(Ordering::Relaxed) {
            return None;
        }
        Some(unpack_position(pb.position.load(Ordering::Relaxed)))
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug)]
enum PlaybackError {
    Format(FormatError),
    Audio(AudioError),
}

impl std::fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackError::Format(e) => e.fmt(f),
            PlaybackError::Audio(e) => e.fmt(f),
        }
    }
}

impl From<FormatError> for PlaybackError {
    fn from(e: FormatError) -> Self {
        PlaybackError::Format(e)
    }
}

impl From<AudioError> for PlaybackError {
    fn from(e: AudioError) -> Self {
        PlaybackError::Audio(e)
    }
}

fn audio_thread(
    data: &[u8],
    mut settings: RenderSettings,
    stop: &AtomicBool,
    position: &AtomicU32,
) -> Result<(), PlaybackError> {
    let (mut output, consumer) = CpalOutput::new()?;
    settings.config.sample_rate = output.sample_rate();

    let mut player = Player::with_config(Module::decode(data)?, settings.config);
    player.set_sequence_position(settings.start);

    output.build_stream(consumer)?;
    output.start()?;
    tracing::info!(rate = settings.config.sample_rate, mix = %settings.mix, "playback started");

    stream(&mut player, &mut output, settings.mix, stop, position);

    // Let the device drain before tearing the stream down
    if !stop.load(Ordering::Relaxed) {
        let silence = [Frame::silence(); BLOCK_FRAMES];
        for _ in 0..(settings.config.sample_rate as usize / BLOCK_FRAMES).max(1) {
            output.write_all(&silence);
        }
    }
    output.stop()?;
    Ok(())
}

/// Render into `output` until the song finishes or `stop` is raised.
fn stream<O: AudioOutput>(
    player: &mut Player<'_>,
    output: &mut O,
    mix: MixMode,
    stop: &AtomicBool,
    position: &AtomicU32,
) {
    let mut block = [0i16; BLOCK_FRAMES * 2];
    let mut out = [Frame::silence(); BLOCK_FRAMES];
    let buf = &mut block[..BLOCK_FRAMES * mix.channels()];

    while !stop.load(Ordering::Relaxed) {
        let more = player.render(buf, mix);
        for (slot, frame) in out.iter_mut().zip(frames(buf, mix)) {
            *slot = frame;
        }
        output.write_all(&out);
        position.store(pack_position(player.position()), Ordering::Relaxed);
        if !more {
            break;
        }
    }
}

fn pack_position(p: PlaybackPosition) -> u32 {
    ((p.sequence as u32 & 0xff) << 24)
        | ((p.pattern as u32) << 16)
        | ((p.row as u32 & 0xff) << 8)
        | p.tick as u32
}

fn unpack_position(v: u32) -> PlaybackPosition {
    PlaybackPosition {
        sequence: (v >> 24) as usize,
        pattern: (v >> 16) as u8,
        row: ((v >> 8) & 0xff) as usize,
        tick: v as u8,
    }
}
