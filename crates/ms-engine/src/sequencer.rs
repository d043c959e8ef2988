//! Row and tick sequencing.
//!
//! One tick is `samples_per_tick` output samples. Every `speed` ticks the
//! next row is read and its four cells are triggered; the ticks between
//! rows only step continuous effects.

use ms_format::{Cell, Module, CHANNELS, ROWS_PER_PATTERN};

use crate::diagnostics::DiagnosticSink;
use crate::frequency::phase_increment;
use crate::state::PlayerState;

/// Result of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Intermediate tick: continuous effects only
    Effects,
    /// A row was triggered
    Row,
    /// A row was triggered and the song ran off its end with looping disabled
    Finished,
}

impl<'a> PlayerState<'a> {
    /// Advance playback by one tick.
    pub(crate) fn advance_tick<S: DiagnosticSink>(
        &mut self,
        module: &Module<'a>,
        sink: &mut S,
    ) -> TickOutcome {
        if self.tick_counter > 1 {
            for channel in &mut self.channels {
                channel.apply_tick_effect(self.phase_base);
            }
            self.tick_counter -= 1;
            return TickOutcome::Effects;
        }

        self.tick_counter = self.speed;

        let pattern = module.pattern_at(self.position).unwrap_or(0);
        let cells = module.row(pattern, self.row).unwrap_or_default();
        self.row += 1;

        for (channel, cell) in cells.iter().enumerate() {
            // Continuous effects only last for the row that arms them
            self.channels[channel].slide = None;
            if cell.has_note() && cell.instrument as usize <= module.instrument_count() {
                self.note_on(module, channel, cell);
            }
            self.apply_row_effect(channel, cell.effect(), sink);
        }

        if self.row >= ROWS_PER_PATTERN {
            self.advance_position();
            self.row = 0;
        }

        if self.position >= module.sequence_length() || self.restart_pending {
            self.position = 0;
            self.restart_pending = false;
            if !self.config.looping {
                return TickOutcome::Finished;
            }
        }

        TickOutcome::Row
    }

    /// Start a note. Instrument 0 replays the channel's current instrument
    /// at its current volume.
    fn note_on(&mut self, module: &Module<'a>, channel: usize, cell: &Cell) {
        debug_assert!(channel < CHANNELS);
        let ch = &mut self.channels[channel];
        if let Some(index) = (cell.instrument as usize).checked_sub(1) {
            if let Some(instrument) = module.instrument(index) {
                ch.instrument = index as u8;
                ch.volume = instrument.default_volume();
            }
        }
        if let Some(instrument) = module.instrument(ch.instrument as usize) {
            ch.trigger(instrument, cell.period, phase_increment(self.phase_base, cell.period));
        }
    }
}
