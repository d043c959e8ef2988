//! In-memory module construction for tests and benchmarks.
//!
//! Produces the byte layout that [`Module::decode`](crate::Module::decode)
//! reads. Only the fields the player uses are written.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::header::{
    Layout, CLASSIC_LAYOUT, INSTRUMENTS_OFFSET, INSTRUMENT_HEADER_LEN, PROTRACKER_LAYOUT,
    PROTRACKER_TAG, TAG_OFFSET, TITLE_LEN,
};
use crate::{Cell, ModuleFormat, CHANNELS, PATTERN_BYTES};

/// One instrument's header fields and sample data.
#[derive(Clone, Debug, Default)]
pub struct SampleSpec {
    pub name: String,
    pub data: Vec<i8>,
    pub volume: u8,
    /// Loop start in bytes
    pub loop_start: u32,
    /// Loop length in bytes (0 or 2 = no loop)
    pub loop_length: u32,
}

impl SampleSpec {
    /// A one-shot sample at the given default volume.
    pub fn new(data: Vec<i8>, volume: u8) -> Self {
        Self {
            data,
            volume,
            loop_length: 2,
            ..Default::default()
        }
    }

    /// Loop `length` bytes starting at `start`.
    pub fn looped(mut self, start: u32, length: u32) -> Self {
        self.loop_start = start;
        self.loop_length = length;
        self
    }
}

/// Builder for module bytes.
#[derive(Clone, Debug)]
pub struct ModuleBuilder {
    format: ModuleFormat,
    title: String,
    instruments: Vec<Option<SampleSpec>>,
    sequence: Vec<u8>,
    cells: Vec<(u8, usize, usize, Cell)>,
}

impl ModuleBuilder {
    pub fn new(format: ModuleFormat) -> Self {
        Self {
            format,
            title: String::new(),
            instruments: vec![None; format.instrument_count()],
            sequence: vec![0],
            cells: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Set instrument `number` (1-based, as it appears in pattern cells).
    pub fn instrument(mut self, number: usize, sample: SampleSpec) -> Self {
        if let Some(slot) = number.checked_sub(1).and_then(|i| self.instruments.get_mut(i)) {
            *slot = Some(sample);
        }
        self
    }

    /// Set the active sequence entries.
    pub fn sequence(mut self, sequence: &[u8]) -> Self {
        self.sequence = sequence.to_vec();
        self
    }

    pub fn cell(mut self, pattern: u8, row: usize, channel: usize, cell: Cell) -> Self {
        self.cells.push((pattern, row, channel, cell));
        self
    }

    /// Place a note.
    pub fn note(self, pattern: u8, row: usize, channel: usize, period: u16, instrument: u8) -> Self {
        self.cell(
            pattern,
            row,
            channel,
            Cell {
                period,
                instrument,
                ..Default::default()
            },
        )
    }

    /// Place an effect with no note.
    pub fn effect(self, pattern: u8, row: usize, channel: usize, command: u8, value: u8) -> Self {
        self.cell(
            pattern,
            row,
            channel,
            Cell {
                command,
                value,
                ..Default::default()
            },
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let layout: Layout = match self.format {
            ModuleFormat::Classic15 => CLASSIC_LAYOUT,
            ModuleFormat::ProTracker31 => PROTRACKER_LAYOUT,
        };
        let mut data = vec![0u8; layout.patterns];

        let title = self.title.as_bytes();
        let n = title.len().min(TITLE_LEN);
        data[..n].copy_from_slice(&title[..n]);

        for (i, spec) in self.instruments.iter().enumerate() {
            let Some(spec) = spec else { continue };
            let at = INSTRUMENTS_OFFSET + i * INSTRUMENT_HEADER_LEN;
            let header = &mut data[at..at + INSTRUMENT_HEADER_LEN];
            let name = spec.name.as_bytes();
            let n = name.len().min(22);
            header[..n].copy_from_slice(&name[..n]);
            header[22..24].copy_from_slice(&halfwords(spec.data.len() as u32 + 1).to_be_bytes());
            header[25] = spec.volume;
            header[26..28].copy_from_slice(&halfwords(spec.loop_start).to_be_bytes());
            header[28..30].copy_from_slice(&halfwords(spec.loop_length).to_be_bytes());
        }

        data[layout.length] = self.sequence.len() as u8;
        let n = self.sequence.len().min(128);
        data[layout.sequence..layout.sequence + n].copy_from_slice(&self.sequence[..n]);
        if self.format == ModuleFormat::ProTracker31 {
            data[TAG_OFFSET..TAG_OFFSET + 4].copy_from_slice(PROTRACKER_TAG);
        }

        let pattern_count = self.sequence.iter().copied().max().unwrap_or(0) as usize + 1;
        let mut patterns = vec![0u8; pattern_count * PATTERN_BYTES];
        for &(pattern, row, channel, cell) in &self.cells {
            let offset = pattern as usize * PATTERN_BYTES + (row * CHANNELS + channel) * 4;
            if let Some(bytes) = patterns.get_mut(offset..offset + 4) {
                bytes.copy_from_slice(&encode_cell(&cell));
            }
        }
        data.extend_from_slice(&patterns);

        for spec in self.instruments.iter().flatten() {
            data.extend(spec.data.iter().map(|&s| s as u8));
            if spec.data.len() % 2 == 1 {
                data.push(0);
            }
        }

        data
    }
}

/// Bytes to halfwords.
fn halfwords(bytes: u32) -> u16 {
    (bytes / 2) as u16
}

fn encode_cell(cell: &Cell) -> [u8; 4] {
    [
        (cell.instrument & 0x10) | ((cell.period >> 8) as u8 & 0x0f),
        cell.period as u8,
        ((cell.instrument & 0x0f) << 4) | (cell.command & 0x0f),
        cell.value,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Effect, Module};

    #[test]
    fn built_module_decodes() {
        let data = ModuleBuilder::new(ModuleFormat::ProTracker31)
            .title("builder")
            .instrument(1, SampleSpec::new(vec![1, 2, 3, 4], 40).looped(2, 2))
            .instrument(2, SampleSpec::new(vec![5, 6, 7, 8, 9, 10], 64).looped(0, 4))
            .sequence(&[0, 1, 0])
            .note(1, 5, 2, 428, 2)
            .effect(1, 5, 3, 0xC, 0x20)
            .build();

        let module = Module::decode(&data).unwrap();
        assert_eq!(module.format(), ModuleFormat::ProTracker31);
        assert_eq!(module.title().as_str(), "builder");
        assert_eq!(module.sequence(), &[0, 1, 0]);
        assert_eq!(module.pattern_count(), 2);

        let first = module.instrument(0).unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(first.default_volume(), 40);
        assert!(first.loop_range().is_none());
        assert_eq!(first.data(), &[1, 2, 3, 4]);

        let second = module.instrument(1).unwrap();
        assert_eq!(second.loop_range(), Some(0..4));
        assert_eq!(second.data(), &[5, 6, 7, 8, 9, 10]);

        let cell = module.cell(1, 5, 2).unwrap();
        assert_eq!((cell.period, cell.instrument), (428, 2));
        assert_eq!(module.cell(1, 5, 3).unwrap().effect(), Effect::SetVolume(0x20));
    }
}
