//! The public player: a decoded module plus its playback state.

use ms_format::{FormatError, Module, CHANNELS};

use crate::channel::ChannelState;
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::mixer::{HardStereo, MixMode, Mixdown, Mono, SoftStereo};
use crate::sequencer::TickOutcome;
use crate::state::{PlayerConfig, PlayerOption, PlayerState};

/// Where playback currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackPosition {
    /// Sequence position
    pub sequence: usize,
    /// Pattern played at that position
    pub pattern: u8,
    /// Next row to be triggered
    pub row: usize,
    /// Ticks left before that row
    pub tick: u8,
}

/// Renders a module into interleaved 16-bit PCM.
///
/// The player borrows the module bytes for `'a`; rendering never
/// allocates. Unsupported effects are reported to `S`.
#[derive(Clone, Debug)]
pub struct Player<'a, S: DiagnosticSink = LogSink> {
    module: Module<'a>,
    state: PlayerState<'a>,
    sink: S,
}

impl<'a> Player<'a> {
    /// Player with the default configuration.
    pub fn new(module: Module<'a>) -> Self {
        Self::with_config(module, PlayerConfig::default())
    }

    pub fn with_config(module: Module<'a>, config: PlayerConfig) -> Self {
        Self::with_sink(module, config, LogSink)
    }

    /// Decode `data` and build a default player for it.
    pub fn load(data: &'a [u8]) -> Result<Self, FormatError> {
        Ok(Self::new(Module::decode(data)?))
    }
}

impl<'a, S: DiagnosticSink> Player<'a, S> {
    pub fn with_sink(module: Module<'a>, config: PlayerConfig, sink: S) -> Self {
        Self {
            module,
            state: PlayerState::new(config),
            sink,
        }
    }

    pub fn set_option(&mut self, option: PlayerOption, enabled: bool) {
        self.state.set_option(option, enabled);
    }

    /// Number of used sequence entries.
    pub fn sequence_length(&self) -> usize {
        self.module.sequence_length()
    }

    /// Jump to the start of sequence position `position`. Ignored when
    /// `position` is past the end. Re-arms a finished player.
    pub fn set_sequence_position(&mut self, position: usize) {
        if position < self.module.sequence_length() {
            self.state.position = position;
            self.state.row = 0;
            self.state.restart_pending = false;
            self.state.finished = false;
        }
    }

    /// Fill `out` with `out.len() / mode.channels()` frames.
    ///
    /// Returns `false` once the song has finished (looping disabled). The
    /// frames after the end in that call still carry the decaying notes;
    /// every later call writes silence until the position is set again.
    pub fn render(&mut self, out: &mut [i16], mode: MixMode) -> bool {
        realtime(|| self.render_mode(out, mode))
    }

    fn render_mode(&mut self, out: &mut [i16], mode: MixMode) -> bool {
        match mode {
            MixMode::Mono => self.fill::<Mono>(out),
            MixMode::StereoSoft => self.fill::<SoftStereo>(out),
            MixMode::StereoHard => self.fill::<HardStereo>(out),
        }
    }

    fn fill<M: Mixdown>(&mut self, out: &mut [i16]) -> bool {
        let frames = out.len() / M::CHANNELS;
        let out = &mut out[..frames * M::CHANNELS];

        if self.state.finished {
            out.fill(0);
            return false;
        }

        for frame in out.chunks_exact_mut(M::CHANNELS) {
            let mut samples = [0i16; CHANNELS];
            for (sample, channel) in samples.iter_mut().zip(self.state.channels.iter_mut()) {
                *sample = channel.render();
            }
            M::mix(samples, frame);

            if !self.state.finished && self.count_sample() == Some(TickOutcome::Finished) {
                self.state.finished = true;
            }
        }

        !self.state.finished
    }

    /// Count one output frame, running a tick when a tick's worth has
    /// elapsed.
    fn count_sample(&mut self) -> Option<TickOutcome> {
        self.state.sample_counter = self.state.sample_counter.saturating_sub(1);
        if self.state.sample_counter > 0 {
            return None;
        }
        self.state.sample_counter = self.state.samples_per_tick;
        Some(self.state.advance_tick(&self.module, &mut self.sink))
    }

    pub fn position(&self) -> PlaybackPosition {
        PlaybackPosition {
            sequence: self.state.position,
            pattern: self.module.pattern_at(self.state.position).unwrap_or(0),
            row: self.state.row,
            tick: self.state.tick_counter,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    pub fn speed(&self) -> u8 {
        self.state.speed
    }

    pub fn tempo(&self) -> u8 {
        self.state.tempo
    }

    pub fn samples_per_tick(&self) -> u32 {
        self.state.samples_per_tick
    }

    /// Channel `index` (0..4).
    pub fn channel(&self, index: usize) -> Option<&ChannelState<'a>> {
        self.state.channels.get(index)
    }

    pub fn module(&self) -> &Module<'a> {
        &self.module
    }

    pub fn state(&self) -> &PlayerState<'a> {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Run a render call, aborting on heap allocation when `alloc_check` is on.
#[cfg(feature = "alloc_check")]
fn realtime<T>(f: impl FnOnce() -> T) -> T {
    assert_no_alloc::assert_no_alloc(f)
}

#[cfg(not(feature = "alloc_check"))]
#[inline]
fn realtime<T>(f: impl FnOnce() -> T) -> T {
    f()
}
