//! Instrument table entries.

use core::ops::Range;

use arrayvec::ArrayString;

use crate::header::InstrumentHeader;

/// Static metadata for one instrument, plus a borrowed view of its
/// sample bytes.
///
/// `len()` is the length declared in the header. `data()` may be shorter
/// when the module is truncated; reads past it are treated as silence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instrument<'a> {
    name: &'a [u8],
    data: &'a [u8],
    length: u32,
    default_volume: u8,
    loop_bounds: Option<(u32, u32)>,
}

impl<'a> Instrument<'a> {
    pub(crate) fn from_header(name: &'a [u8], header: &InstrumentHeader, data: &'a [u8]) -> Self {
        let length = header.length_bytes();
        Self {
            name,
            data,
            length,
            default_volume: header.default_volume(),
            loop_bounds: loop_bounds(
                header.loop_start_bytes(),
                header.loop_length_bytes(),
                length,
            ),
        }
    }

    /// Instrument name up to the first NUL.
    pub fn name(&self) -> ArrayString<22> {
        text_field(self.name)
    }

    /// Declared sample length in bytes.
    pub fn len(&self) -> u32 {
        self.length
    }

    /// Returns true if the instrument has no sample data.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Default volume (0-64).
    pub fn default_volume(&self) -> u8 {
        self.default_volume
    }

    /// Loop region in bytes, or `None` for a one-shot sample.
    pub fn loop_range(&self) -> Option<Range<u32>> {
        self.loop_bounds.map(|(start, end)| start..end)
    }

    /// Sample bytes available in the module buffer (signed 8-bit PCM).
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Signed sample at `index`, or 0 outside the available bytes.
    #[inline]
    pub fn sample(&self, index: usize) -> i8 {
        self.data.get(index).map_or(0, |&b| b as i8)
    }
}

/// A loop length of 2 bytes (one halfword) marks "no loop"; 0 is treated
/// the same. The region is clamped to the sample and dropped if empty.
fn loop_bounds(start: u32, length: u32, sample_len: u32) -> Option<(u32, u32)> {
    if length <= 2 {
        return None;
    }
    let start = start.min(sample_len);
    let end = start.saturating_add(length).min(sample_len);
    (end > start).then_some((start, end))
}

/// Decode a fixed-size text field: stop at the first NUL, replace
/// non-ASCII bytes, trim trailing spaces.
pub(crate) fn text_field<const N: usize>(bytes: &[u8]) -> ArrayString<N> {
    let mut out = ArrayString::new();
    for &b in bytes.iter().take_while(|&&b| b != 0) {
        let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' };
        if out.try_push(c).is_err() {
            break;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_byte_loop_means_no_loop() {
        assert_eq!(loop_bounds(0, 2, 100), None);
        assert_eq!(loop_bounds(0, 0, 100), None);
    }

    #[test]
    fn loop_within_sample() {
        assert_eq!(loop_bounds(10, 20, 100), Some((10, 30)));
    }

    #[test]
    fn loop_clamped_to_sample_length() {
        assert_eq!(loop_bounds(80, 40, 100), Some((80, 100)));
        assert_eq!(loop_bounds(120, 40, 100), None);
    }

    #[test]
    fn text_field_stops_at_nul() {
        let name: ArrayString<22> = text_field(b"st-06:snare\0garbage");
        assert_eq!(name.as_str(), "st-06:snare");
    }

    #[test]
    fn text_field_replaces_non_ascii() {
        let name: ArrayString<20> = text_field(&[b'a', 0xff, b'b', b' ', b' ']);
        assert_eq!(name.as_str(), "a?b");
    }

    #[test]
    fn sample_reads_past_data_are_silent() {
        let header = InstrumentHeader {
            name: [0; 22],
            length: 4,
            finetune: 0,
            volume: 64,
            loop_start: 0,
            loop_length: 1,
        };
        let data = [0x80u8, 0x7f];
        let inst = Instrument::from_header(&[], &header, &data);
        assert_eq!(inst.len(), 8);
        assert_eq!(inst.sample(0), -128);
        assert_eq!(inst.sample(1), 127);
        assert_eq!(inst.sample(5), 0);
        assert!(inst.loop_range().is_none());
    }
}
