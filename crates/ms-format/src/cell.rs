//! Pattern cell (one channel of one row).

use crate::effect::Effect;

/// A decoded 4-byte pattern cell.
///
/// Byte layout:
/// - Byte 0: bit 4 = instrument bit 4, low nibble = period bits 8..11
/// - Byte 1: period bits 0..7
/// - Byte 2: high nibble = instrument bits 0..3, low nibble = effect command
/// - Byte 3: effect value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// Amiga period (0 = no note)
    pub period: u16,
    /// Instrument number (0 = keep the channel's current instrument)
    pub instrument: u8,
    /// Effect command nibble
    pub command: u8,
    /// Effect value byte
    pub value: u8,
}

impl Cell {
    /// Decode a cell from its stored byte order.
    pub fn decode(bytes: [u8; 4]) -> Self {
        Self {
            period: (((bytes[0] & 0x0f) as u16) << 8) | bytes[1] as u16,
            instrument: (bytes[0] & 0x10) | (bytes[2] >> 4),
            command: bytes[2] & 0x0f,
            value: bytes[3],
        }
    }

    /// Returns true if the cell carries a note.
    pub fn has_note(&self) -> bool {
        self.period != 0
    }

    pub fn effect(&self) -> Effect {
        Effect::decode(self.command, self.value)
    }
}
