//! Channel state and the per-sample synthesizer.

use ms_format::Instrument;

use crate::frequency::{FRACTION_BITS, FRACTION_MASK, FRACTION_ONE};

/// A pitch slide armed by the current row, applied on each intermediate tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PitchSlide {
    /// Decrease the period (raise pitch) by this much per tick
    Up(u8),
    /// Increase the period (lower pitch) by this much per tick
    Down(u8),
}

/// Loop progress of the playing sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    /// One-shot: stop at the end of the sample
    #[default]
    Off,
    /// Looped sample still in its first pass
    Armed,
    /// Past the sample end once; wraps between loop start and end
    Looping,
}

/// Mixing state for a single tracker channel.
#[derive(Clone, Copy, Debug)]
pub struct ChannelState<'a> {
    /// Is the channel currently producing sound?
    pub active: bool,
    /// Current instrument (zero-based)
    pub instrument: u8,
    /// Current volume (0-64)
    pub volume: u8,
    /// Current Amiga period (higher = lower pitch)
    pub pitch: u16,
    /// Continuous effect armed for this row
    pub slide: Option<PitchSlide>,
    /// Sample bytes of the current instrument
    sample: &'a [u8],
    /// Current position in sample (20.12 fixed-point)
    pub position: u32,
    /// Playback increment (20.12 fixed-point)
    pub increment: u32,
    /// Sample length (20.12 fixed-point)
    pub length: u32,
    pub loop_state: LoopState,
    /// Loop start (20.12 fixed-point)
    pub loop_start: u32,
    /// Loop end (20.12 fixed-point)
    pub loop_end: u32,
}

impl Default for ChannelState<'_> {
    fn default() -> Self {
        Self {
            active: false,
            instrument: 0,
            volume: 64,
            pitch: 0,
            slide: None,
            sample: &[],
            position: 0,
            increment: 0,
            length: 0,
            loop_state: LoopState::Off,
            loop_start: 0,
            loop_end: 0,
        }
    }
}

impl<'a> ChannelState<'a> {
    /// Create a new channel state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `instrument` from its first byte at `period`.
    pub fn trigger(&mut self, instrument: &Instrument<'a>, period: u16, increment: u32) {
        self.active = true;
        self.sample = instrument.data();
        self.position = 0;
        self.length = instrument.len() << FRACTION_BITS;
        match instrument.loop_range() {
            Some(range) => {
                self.loop_state = LoopState::Armed;
                self.loop_start = range.start << FRACTION_BITS;
                self.loop_end = range.end << FRACTION_BITS;
            }
            None => self.loop_state = LoopState::Off,
        }
        self.increment = increment;
        self.pitch = period;
    }

    /// Stop playback.
    pub fn stop(&mut self) {
        self.active = false;
    }

    #[inline]
    fn sample_at(&self, index: usize) -> i32 {
        self.sample.get(index).map_or(0, |&b| b as i8 as i32) * 0x100
    }

    /// Produce the next output sample and advance the playback position.
    ///
    /// Inactive channels return 0.
    pub fn render(&mut self) -> i16 {
        if !self.active {
            return 0;
        }

        // Blend the two nearest sample points by the fractional position
        let index = (self.position >> FRACTION_BITS) as usize;
        let frac = (self.position & FRACTION_MASK) as i32;
        let c1 = self.sample_at(index);
        let c2 = if index + 1 < (self.length >> FRACTION_BITS) as usize {
            self.sample_at(index + 1)
        } else {
            c1
        };
        let mut c = (c1 * (FRACTION_ONE as i32 - frac) + c2 * frac) >> FRACTION_BITS;
        c = c * self.volume as i32 / 64;

        self.position = self.position.saturating_add(self.increment);

        if self.loop_state != LoopState::Looping && self.position > self.length {
            match self.loop_state {
                LoopState::Off => self.active = false,
                _ => self.loop_state = LoopState::Looping,
            }
        }
        if self.loop_state == LoopState::Looping && self.position > self.loop_end {
            self.position = self.loop_start;
        }

        c as i16
    }
}
