//! Effect interpretation.
//!
//! Row effects run once when a row is triggered. Pitch slides are armed
//! on the row and stepped on every intermediate tick; both halves live
//! here so each continuous effect reads in one place.

use ms_format::{break_row, Effect, ROWS_PER_PATTERN};

use crate::channel::{ChannelState, PitchSlide};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Unsupported};
use crate::frequency::{clamp_period, phase_increment};
use crate::state::PlayerState;

impl PlayerState<'_> {
    /// Apply a row effect for `channel`. Unsupported effects are reported
    /// and otherwise ignored.
    pub(crate) fn apply_row_effect<S: DiagnosticSink>(
        &mut self,
        channel: usize,
        effect: Effect,
        sink: &mut S,
    ) {
        let report = |sink: &mut S, reason| {
            let (command, value) = effect.raw();
            sink.report(Diagnostic {
                channel: channel as u8,
                command,
                value,
                reason,
            });
        };

        match effect {
            Effect::None => {}
            Effect::Arpeggio(_) => report(sink, Unsupported::Arpeggio),
            Effect::PortaUp(step) => self.channels[channel].slide = Some(PitchSlide::Up(step)),
            Effect::PortaDown(step) => self.channels[channel].slide = Some(PitchSlide::Down(step)),
            Effect::VolumeSlide(delta) => {
                let ch = &mut self.channels[channel];
                ch.volume = (ch.volume as i16 + delta as i16).clamp(0, 64) as u8;
            }
            Effect::PositionJump(target) => {
                self.row = 0;
                self.position = target as usize;
                // A jump back to the start is how most songs loop
                self.restart_pending = target == 0;
            }
            Effect::SetVolume(volume) => self.channels[channel].volume = volume.min(64),
            Effect::PatternBreak(value) => {
                let row = break_row(value) as usize;
                if row >= ROWS_PER_PATTERN {
                    report(sink, Unsupported::PatternBreakRow);
                } else {
                    self.row = row;
                    self.advance_position();
                }
            }
            Effect::SetSpeed(speed) => {
                self.speed = speed;
                self.tick_counter = speed;
            }
            Effect::SetTempo(tempo) => {
                if self.config.support_tempo {
                    self.set_tempo(tempo);
                } else {
                    report(sink, Unsupported::TempoDisabled);
                }
            }
            Effect::Extended(_) => report(sink, Unsupported::Extended),
            Effect::Unknown { .. } => report(sink, Unsupported::Unknown),
        }
    }
}

impl ChannelState<'_> {
    /// Step the armed pitch slide by one tick.
    pub(crate) fn apply_tick_effect(&mut self, phase_base: u32) {
        let Some(slide) = self.slide else { return };
        self.pitch = match slide {
            PitchSlide::Up(step) => clamp_period(self.pitch.saturating_sub(step as u16)),
            PitchSlide::Down(step) => clamp_period(self.pitch.saturating_add(step as u16)),
        };
        self.increment = phase_increment(phase_base, self.pitch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{phase_base, PERIOD_MAX, PERIOD_MIN};
    use crate::state::{PlayerConfig, PlayerOption};

    type Sink = heapless::Vec<Diagnostic, 8>;

    fn state() -> PlayerState<'static> {
        PlayerState::new(PlayerConfig::default())
    }

    fn apply(state: &mut PlayerState<'_>, effect: Effect) -> Sink {
        let mut sink = Sink::new();
        state.apply_row_effect(0, effect, &mut sink);
        sink
    }

    #[test]
    fn set_volume_clamps_to_64() {
        let mut s = state();
        apply(&mut s, Effect::SetVolume(32));
        assert_eq!(s.channels[0].volume, 32);
        apply(&mut s, Effect::SetVolume(100));
        assert_eq!(s.channels[0].volume, 64);
    }

    #[test]
    fn volume_slide_clamps_both_ways() {
        let mut s = state();
        s.channels[0].volume = 60;
        apply(&mut s, Effect::VolumeSlide(10));
        assert_eq!(s.channels[0].volume, 64);
        s.channels[0].volume = 4;
        apply(&mut s, Effect::VolumeSlide(-10));
        assert_eq!(s.channels[0].volume, 0);
        s.channels[0].volume = 30;
        apply(&mut s, Effect::VolumeSlide(5));
        assert_eq!(s.channels[0].volume, 35);
    }

    #[test]
    fn porta_arms_a_slide_only() {
        let mut s = state();
        s.channels[0].pitch = 428;
        apply(&mut s, Effect::PortaUp(4));
        assert_eq!(s.channels[0].slide, Some(PitchSlide::Up(4)));
        assert_eq!(s.channels[0].pitch, 428);
        apply(&mut s, Effect::PortaDown(2));
        assert_eq!(s.channels[0].slide, Some(PitchSlide::Down(2)));
    }

    #[test]
    fn tick_slide_moves_pitch_and_increment() {
        let base = phase_base(44100);
        let mut ch = ChannelState::new();
        ch.pitch = 428;
        ch.slide = Some(PitchSlide::Up(8));
        ch.apply_tick_effect(base);
        assert_eq!(ch.pitch, 420);
        assert_eq!(ch.increment, phase_increment(base, 420));

        ch.slide = Some(PitchSlide::Down(8));
        ch.apply_tick_effect(base);
        assert_eq!(ch.pitch, 428);
    }

    #[test]
    fn tick_slide_clamps_pitch() {
        let base = phase_base(44100);
        let mut ch = ChannelState::new();
        ch.pitch = PERIOD_MIN + 1;
        ch.slide = Some(PitchSlide::Up(0xff));
        ch.apply_tick_effect(base);
        assert_eq!(ch.pitch, PERIOD_MIN);

        ch.pitch = PERIOD_MAX - 1;
        ch.slide = Some(PitchSlide::Down(0xff));
        ch.apply_tick_effect(base);
        assert_eq!(ch.pitch, PERIOD_MAX);
    }

    #[test]
    fn no_slide_leaves_channel_alone() {
        let mut ch = ChannelState::new();
        ch.pitch = 428;
        ch.increment = 5;
        ch.apply_tick_effect(phase_base(44100));
        assert_eq!((ch.pitch, ch.increment), (428, 5));
    }

    #[test]
    fn position_jump_resets_row() {
        let mut s = state();
        s.row = 17;
        apply(&mut s, Effect::PositionJump(3));
        assert_eq!((s.position, s.row), (3, 0));
        assert!(!s.restart_pending);
    }

    #[test]
    fn position_jump_to_zero_marks_restart() {
        let mut s = state();
        s.position = 4;
        apply(&mut s, Effect::PositionJump(0));
        assert_eq!(s.position, 0);
        assert!(s.restart_pending);
    }

    #[test]
    fn pattern_break_is_decimal() {
        let mut s = state();
        s.position = 1;
        apply(&mut s, Effect::PatternBreak(0x16));
        assert_eq!((s.position, s.row), (2, 16));
    }

    #[test]
    fn pattern_break_past_63_is_ignored() {
        let mut s = state();
        s.position = 1;
        s.row = 9;
        let sink = apply(&mut s, Effect::PatternBreak(0x64));
        assert_eq!((s.position, s.row), (1, 9));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].reason, Unsupported::PatternBreakRow);
        assert_eq!((sink[0].command, sink[0].value), (0xD, 0x64));
    }

    #[test]
    fn set_speed_resets_tick_counter() {
        let mut s = state();
        apply(&mut s, Effect::SetSpeed(3));
        assert_eq!((s.speed, s.tick_counter), (3, 3));
    }

    #[test]
    fn set_tempo_recomputes_tick_length() {
        let mut s = state();
        apply(&mut s, Effect::SetTempo(250));
        assert_eq!(s.tempo, 250);
        assert_eq!(s.samples_per_tick, 441);
    }

    #[test]
    fn set_tempo_ignored_when_disabled() {
        let mut s = state();
        s.set_option(PlayerOption::SupportTempo, false);
        let sink = apply(&mut s, Effect::SetTempo(32));
        assert_eq!((s.tempo, s.samples_per_tick), (125, 882));
        assert_eq!(sink[0].reason, Unsupported::TempoDisabled);
    }

    #[test]
    fn unsupported_effects_are_reported_not_applied() {
        let mut s = state();
        let before = s.clone();
        let mut sink = Sink::new();
        s.apply_row_effect(1, Effect::Arpeggio(0x37), &mut sink);
        s.apply_row_effect(2, Effect::Extended(0x01), &mut sink);
        s.apply_row_effect(3, Effect::Unknown { command: 4, value: 0x44 }, &mut sink);

        let reasons: heapless::Vec<Unsupported, 8> = sink.iter().map(|d| d.reason).collect();
        assert_eq!(
            reasons.as_slice(),
            &[Unsupported::Arpeggio, Unsupported::Extended, Unsupported::Unknown]
        );
        assert_eq!(sink[2].channel, 3);
        assert_eq!((s.position, s.row, s.speed), (before.position, before.row, before.speed));
        for (a, b) in s.channels.iter().zip(before.channels.iter()) {
            assert_eq!((a.volume, a.slide), (b.volume, b.slide));
        }
    }
}
