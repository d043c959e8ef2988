//! Fixed-offset header layout.

use binrw::io::Cursor;
use binrw::BinRead;

use crate::FormatError;

/// Offset of the title.
pub const TITLE_OFFSET: usize = 0x00;
/// Title length in bytes (not guaranteed NUL-terminated).
pub const TITLE_LEN: usize = 20;
/// Offset of the first instrument header.
pub const INSTRUMENTS_OFFSET: usize = 0x14;
/// Size of one instrument header.
pub const INSTRUMENT_HEADER_LEN: usize = 30;
/// Offset of the 31-instrument format tag.
pub const TAG_OFFSET: usize = 0x438;
/// Tag that marks the 31-instrument layout.
pub const PROTRACKER_TAG: &[u8; 4] = b"M.K.";

/// Offsets that depend on the instrument count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub instruments: usize,
    pub length: usize,
    pub sequence: usize,
    pub patterns: usize,
}

/// 15-instrument SoundTracker layout.
pub const CLASSIC_LAYOUT: Layout = Layout {
    instruments: 15,
    length: 0x1d6,
    sequence: 0x1d8,
    patterns: 0x258,
};

/// 31-instrument ProTracker layout.
pub const PROTRACKER_LAYOUT: Layout = Layout {
    instruments: 31,
    length: 0x3b6,
    sequence: 0x3b8,
    patterns: 0x43c,
};

/// One 30-byte instrument header, big-endian.
///
/// Lengths and loop fields are stored in halfwords.
#[derive(BinRead, Clone, Copy, Debug, PartialEq, Eq)]
#[br(big)]
pub struct InstrumentHeader {
    pub name: [u8; 22],
    pub length: u16,
    pub finetune: u8,
    pub volume: u8,
    pub loop_start: u16,
    pub loop_length: u16,
}

impl InstrumentHeader {
    /// Read the header at `offset`. The caller has already checked that
    /// the header region lies inside `data`.
    pub fn read_at(data: &[u8], offset: usize) -> Result<Self, FormatError> {
        let record = data
            .get(offset..offset + INSTRUMENT_HEADER_LEN)
            .ok_or(FormatError::Header { offset })?;
        Self::read(&mut Cursor::new(record)).map_err(|_| FormatError::Header { offset })
    }

    pub fn length_bytes(&self) -> u32 {
        self.length as u32 * 2
    }

    pub fn loop_start_bytes(&self) -> u32 {
        self.loop_start as u32 * 2
    }

    pub fn loop_length_bytes(&self) -> u32 {
        self.loop_length as u32 * 2
    }

    /// Default volume: low 7 bits, clamped to 64.
    pub fn default_volume(&self) -> u8 {
        (self.volume & 0x7f).min(64)
    }
}
