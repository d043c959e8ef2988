//! PCM byte encoding.
//!
//! The engine renders native `i16` samples; consumers that want bytes pick
//! the byte order explicitly instead of depending on the host.

/// Byte order of encoded samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// Used by WAV files and most sound devices
    #[default]
    Little,
    Big,
    /// Whatever the host uses
    Native,
}

impl ByteOrder {
    #[inline]
    fn encode(self, sample: i16) -> [u8; 2] {
        match self {
            ByteOrder::Little => sample.to_le_bytes(),
            ByteOrder::Big => sample.to_be_bytes(),
            ByteOrder::Native => sample.to_ne_bytes(),
        }
    }
}

/// Encode `samples` into `out`, two bytes each. Stops when either side
/// runs out; returns the number of bytes written.
pub fn encode_pcm(samples: &[i16], order: ByteOrder, out: &mut [u8]) -> usize {
    let mut written = 0;
    for (sample, bytes) in samples.iter().zip(out.chunks_exact_mut(2)) {
        bytes.copy_from_slice(&order.encode(*sample));
        written += 2;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_and_big_endian() {
        let mut out = [0u8; 4];
        assert_eq!(encode_pcm(&[0x1234, -2], ByteOrder::Little, &mut out), 4);
        assert_eq!(out, [0x34, 0x12, 0xfe, 0xff]);
        assert_eq!(encode_pcm(&[0x1234, -2], ByteOrder::Big, &mut out), 4);
        assert_eq!(out, [0x12, 0x34, 0xff, 0xfe]);
    }

    #[test]
    fn native_matches_host() {
        let mut out = [0u8; 2];
        encode_pcm(&[0x0102], ByteOrder::Native, &mut out);
        assert_eq!(out, 0x0102i16.to_ne_bytes());
    }

    #[test]
    fn short_output_truncates() {
        let mut out = [0u8; 3];
        assert_eq!(encode_pcm(&[1, 2, 3], ByteOrder::Little, &mut out), 2);
        assert_eq!(out, [1, 0, 0]);
    }
}
