//! Mutable playback state.

use ms_format::CHANNELS;

use crate::channel::ChannelState;
use crate::frequency::{phase_base, samples_per_tick, DEFAULT_SPEED, DEFAULT_TEMPO};

/// Output rate used when none is configured.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Player configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Output sample rate in Hz, fixed for the life of the player
    pub sample_rate: u32,
    /// Wrap to the start instead of finishing when the sequence ends
    pub looping: bool,
    /// Honor Fxx tempo values >= 32
    pub support_tempo: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            looping: true,
            support_tempo: true,
        }
    }
}

/// Runtime options that can be changed after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerOption {
    /// See [`PlayerConfig::looping`]
    Loop,
    /// See [`PlayerConfig::support_tempo`]
    SupportTempo,
}

/// Everything the engine mutates while playing.
///
/// The module itself is never part of this state; the channels only
/// borrow its sample data.
#[derive(Clone, Debug)]
pub struct PlayerState<'a> {
    pub(crate) channels: [ChannelState<'a>; CHANNELS],
    /// Sequence position (0..length)
    pub(crate) position: usize,
    /// Row within the current pattern (0..64)
    pub(crate) row: usize,
    /// Ticks per row
    pub(crate) speed: u8,
    /// Ticks left before the next row
    pub(crate) tick_counter: u8,
    pub(crate) tempo: u8,
    pub(crate) samples_per_tick: u32,
    /// Output samples left before the next tick
    pub(crate) sample_counter: u32,
    /// Set by a jump to position 0; treated as running off the sequence end
    pub(crate) restart_pending: bool,
    /// Latched once the song ends with looping disabled
    pub(crate) finished: bool,
    pub(crate) phase_base: u32,
    pub(crate) config: PlayerConfig,
}

impl<'a> PlayerState<'a> {
    /// Fresh state: speed 6, tempo 125, position 0. A zero sample rate is
    /// treated as 1 Hz.
    pub fn new(mut config: PlayerConfig) -> Self {
        config.sample_rate = config.sample_rate.max(1);
        let samples_per_tick = samples_per_tick(DEFAULT_TEMPO, config.sample_rate).max(1);
        Self {
            channels: [ChannelState::new(); CHANNELS],
            position: 0,
            row: 0,
            speed: DEFAULT_SPEED,
            tick_counter: 0,
            tempo: DEFAULT_TEMPO,
            samples_per_tick,
            sample_counter: samples_per_tick,
            restart_pending: false,
            finished: false,
            phase_base: phase_base(config.sample_rate),
            config,
        }
    }

    pub fn channels(&self) -> &[ChannelState<'a>; CHANNELS] {
        &self.channels
    }

    pub fn sequence_position(&self) -> usize {
        self.position
    }

    pub fn row_position(&self) -> usize {
        self.row
    }

    /// Ticks per row.
    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn tempo(&self) -> u8 {
        self.tempo
    }

    /// Ticks left before the next row.
    pub fn tick_counter(&self) -> u8 {
        self.tick_counter
    }

    pub fn samples_per_tick(&self) -> u32 {
        self.samples_per_tick
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn set_option(&mut self, option: PlayerOption, enabled: bool) {
        match option {
            PlayerOption::Loop => self.config.looping = enabled,
            PlayerOption::SupportTempo => self.config.support_tempo = enabled,
        }
    }

    pub(crate) fn set_tempo(&mut self, tempo: u8) {
        self.tempo = tempo;
        self.samples_per_tick = samples_per_tick(tempo, self.config.sample_rate).max(1);
    }

    /// Move to the next sequence position. A pending restart absorbs the
    /// step and leaves the song at position 0.
    pub(crate) fn advance_position(&mut self) {
        if self.restart_pending {
            self.restart_pending = false;
            self.position = 0;
        } else {
            self.position += 1;
        }
    }
}
