//! ProTracker effect commands.
//!
//! The effect encoding is a command nibble (0x0-0xF) plus a parameter byte.

/// A decoded effect column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Effect {
    #[default]
    None,
    /// 0xy: arpeggio (not emulated)
    Arpeggio(u8),
    /// 1xx: slide pitch up by xx period units per tick
    PortaUp(u8),
    /// 2xx: slide pitch down by xx period units per tick
    PortaDown(u8),
    /// Axx: add the signed parameter to the channel volume
    VolumeSlide(i8),
    /// Bxx: jump to sequence position xx
    PositionJump(u8),
    /// Cxx: set channel volume (clamped to 64 when applied)
    SetVolume(u8),
    /// Dxy: break to row xy (BCD) of the next sequence position
    PatternBreak(u8),
    /// Fxx with xx in 1..=30: ticks per row
    SetSpeed(u8),
    /// Fxx with xx >= 32: tempo
    SetTempo(u8),
    /// Exy: filter and extended commands (not emulated)
    Extended(u8),
    /// Commands 3-9 (not emulated)
    Unknown { command: u8, value: u8 },
}

impl Effect {
    /// Decode a command nibble and parameter byte.
    pub fn decode(command: u8, value: u8) -> Self {
        match command & 0x0f {
            0x0 if value == 0 => Effect::None,
            0x0 => Effect::Arpeggio(value),
            0x1 => Effect::PortaUp(value),
            0x2 => Effect::PortaDown(value),
            0xA => Effect::VolumeSlide(value as i8),
            0xB => Effect::PositionJump(value),
            0xC => Effect::SetVolume(value),
            0xD => Effect::PatternBreak(value),
            0xE => Effect::Extended(value),
            0xF => match value {
                1..=30 => Effect::SetSpeed(value),
                32..=255 => Effect::SetTempo(value),
                _ => Effect::None,
            },
            command => Effect::Unknown { command, value },
        }
    }

    /// Command nibble and parameter byte this effect was decoded from.
    pub fn raw(&self) -> (u8, u8) {
        match *self {
            Effect::None => (0, 0),
            Effect::Arpeggio(v) => (0x0, v),
            Effect::PortaUp(v) => (0x1, v),
            Effect::PortaDown(v) => (0x2, v),
            Effect::VolumeSlide(v) => (0xA, v as u8),
            Effect::PositionJump(v) => (0xB, v),
            Effect::SetVolume(v) => (0xC, v),
            Effect::PatternBreak(v) => (0xD, v),
            Effect::Extended(v) => (0xE, v),
            Effect::SetSpeed(v) | Effect::SetTempo(v) => (0xF, v),
            Effect::Unknown { command, value } => (command, value),
        }
    }
}

/// Decode a pattern-break parameter: two decimal digits, tens in the high
/// nibble. Non-decimal nibbles decode past 99.
pub fn break_row(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0f)
}
