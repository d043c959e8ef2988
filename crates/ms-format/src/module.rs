//! ProTracker/SoundTracker module decoder.

use arrayvec::{ArrayString, ArrayVec};

use crate::cell::Cell;
use crate::header::{
    InstrumentHeader, Layout, CLASSIC_LAYOUT, INSTRUMENTS_OFFSET, INSTRUMENT_HEADER_LEN,
    PROTRACKER_LAYOUT, PROTRACKER_TAG, TAG_OFFSET, TITLE_LEN, TITLE_OFFSET,
};
use crate::instrument::{text_field, Instrument};
use crate::{FormatError, CHANNELS, MAX_INSTRUMENTS, PATTERN_BYTES, ROWS_PER_PATTERN, SEQUENCE_SLOTS};

/// Header variant, detected from the tag at 0x438.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleFormat {
    /// SoundTracker: 15 instruments, no tag
    Classic15,
    /// ProTracker: 31 instruments, `M.K.` tag
    ProTracker31,
}

impl ModuleFormat {
    /// Anything without the `M.K.` tag is assumed to be the 15-instrument layout.
    pub fn detect(data: &[u8]) -> Self {
        match data.get(TAG_OFFSET..TAG_OFFSET + 4) {
            Some(tag) if tag == PROTRACKER_TAG => ModuleFormat::ProTracker31,
            _ => ModuleFormat::Classic15,
        }
    }

    pub fn instrument_count(self) -> usize {
        self.layout().instruments
    }

    /// Bytes before the first pattern.
    pub fn header_len(self) -> usize {
        self.layout().patterns
    }

    pub(crate) fn layout(self) -> Layout {
        match self {
            ModuleFormat::Classic15 => CLASSIC_LAYOUT,
            ModuleFormat::ProTracker31 => PROTRACKER_LAYOUT,
        }
    }
}

/// An immutable, zero-copy view of a decoded module.
///
/// All tables borrow the caller's buffer, which must outlive the module
/// and anything built from it.
#[derive(Clone, Debug)]
pub struct Module<'a> {
    format: ModuleFormat,
    title: &'a [u8],
    length: u8,
    sequence: &'a [u8],
    patterns: &'a [u8],
    sample_offset: usize,
    instruments: ArrayVec<Instrument<'a>, MAX_INSTRUMENTS>,
}

impl<'a> Module<'a> {
    /// Decode a module from bytes.
    ///
    /// Fails if the header, the sequence length, or the patterns used by
    /// the sequence do not fit. Sample data cut short by the end of the
    /// buffer is accepted and plays as silence past the cut.
    ///
    /// Only the first `length` sequence entries size the pattern block, so
    /// a pattern named only by an unused slot does not shift the samples.
    /// Players that scan all 128 slots place samples differently for such
    /// files.
    pub fn decode(data: &'a [u8]) -> Result<Self, FormatError> {
        let format = ModuleFormat::detect(data);
        let layout = format.layout();

        if data.len() < layout.patterns {
            return Err(FormatError::TooSmall {
                needed: layout.patterns,
                actual: data.len(),
            });
        }

        let length = data[layout.length];
        if length == 0 || length as usize > SEQUENCE_SLOTS {
            return Err(FormatError::InvalidLength(length));
        }

        let sequence = &data[layout.sequence..layout.sequence + SEQUENCE_SLOTS];

        // Only the used entries decide how many patterns are stored
        let max_pattern = sequence[..length as usize]
            .iter()
            .copied()
            .max()
            .unwrap_or(0) as usize;
        let pattern_count = max_pattern + 1;
        let patterns_end = layout.patterns + pattern_count * PATTERN_BYTES;
        if data.len() < patterns_end {
            return Err(FormatError::PatternsOutOfBounds {
                patterns: pattern_count,
                needed: patterns_end,
                actual: data.len(),
            });
        }

        // Sample data follows the last pattern, one instrument after another
        let mut instruments = ArrayVec::new();
        let mut offset = patterns_end;
        for i in 0..layout.instruments {
            let header_offset = INSTRUMENTS_OFFSET + i * INSTRUMENT_HEADER_LEN;
            let header = InstrumentHeader::read_at(data, header_offset)?;
            let len = header.length_bytes() as usize;
            let start = offset.min(data.len());
            let end = offset.saturating_add(len).min(data.len());
            let name = &data[header_offset..header_offset + header.name.len()];
            instruments.push(Instrument::from_header(name, &header, &data[start..end]));
            offset = offset.saturating_add(len);
        }

        Ok(Self {
            format,
            title: &data[TITLE_OFFSET..TITLE_OFFSET + TITLE_LEN],
            length,
            sequence,
            patterns: &data[layout.patterns..patterns_end],
            sample_offset: patterns_end,
            instruments,
        })
    }

    pub fn format(&self) -> ModuleFormat {
        self.format
    }

    /// Song title up to the first NUL.
    pub fn title(&self) -> ArrayString<TITLE_LEN> {
        text_field(self.title)
    }

    /// Number of instruments in the table (15 or 31).
    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }

    pub fn instruments(&self) -> &[Instrument<'a>] {
        &self.instruments
    }

    /// Instrument by zero-based index.
    pub fn instrument(&self, index: usize) -> Option<&Instrument<'a>> {
        self.instruments.get(index)
    }

    /// Number of active sequence entries (1-128).
    pub fn sequence_length(&self) -> usize {
        self.length as usize
    }

    /// The active sequence entries.
    pub fn sequence(&self) -> &'a [u8] {
        &self.sequence[..self.length as usize]
    }

    /// Pattern number at a sequence position.
    pub fn pattern_at(&self, position: usize) -> Option<u8> {
        self.sequence().get(position).copied()
    }

    /// Number of patterns stored in the module.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len() / PATTERN_BYTES
    }

    /// Byte offset of the first instrument's sample data.
    pub fn sample_offset(&self) -> usize {
        self.sample_offset
    }

    /// A single cell.
    pub fn cell(&self, pattern: u8, row: usize, channel: usize) -> Option<Cell> {
        if row >= ROWS_PER_PATTERN || channel >= CHANNELS {
            return None;
        }
        let offset = pattern as usize * PATTERN_BYTES + (row * CHANNELS + channel) * 4;
        let bytes = self.patterns.get(offset..offset + 4)?;
        Some(Cell::decode([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// All four cells of a row.
    pub fn row(&self, pattern: u8, row: usize) -> Option<[Cell; CHANNELS]> {
        let mut cells = [Cell::default(); CHANNELS];
        for (channel, cell) in cells.iter_mut().enumerate() {
            *cell = self.cell(pattern, row, channel)?;
        }
        Some(cells)
    }
}
