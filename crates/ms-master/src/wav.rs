//! WAV encoding for 16-bit PCM.

use ms_engine::{encode_pcm, ByteOrder};
use std::io::Write;

const HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;

/// Write `samples` (interleaved, `channels` per frame) as a WAV file.
pub fn write_wav(
    w: &mut impl Write,
    samples: &[i16],
    channels: u16,
    sample_rate: u32,
) -> std::io::Result<()> {
    w.write_all(&header(samples.len(), channels, sample_rate))?;

    let mut buf = [0u8; 4096];
    for chunk in samples.chunks(buf.len() / 2) {
        let n = encode_pcm(chunk, ByteOrder::Little, &mut buf);
        w.write_all(&buf[..n])?;
    }
    Ok(())
}

/// Encode a whole WAV file in memory.
pub fn samples_to_wav(samples: &[i16], channels: u16, sample_rate: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + samples.len() * 2);
    out.extend_from_slice(&header(samples.len(), channels, sample_rate));
    let start = out.len();
    out.resize(start + samples.len() * 2, 0);
    encode_pcm(samples, ByteOrder::Little, &mut out[start..]);
    out
}

/// RIFF header plus the `fmt ` chunk and the `data` chunk header.
fn header(samples: usize, channels: u16, sample_rate: u32) -> [u8; HEADER_LEN] {
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let data_size = (samples * 2) as u32;

    let mut h = [0u8; HEADER_LEN];
    h[0..4].copy_from_slice(b"RIFF");
    h[4..8].copy_from_slice(&(36 + data_size).to_le_bytes());
    h[8..12].copy_from_slice(b"WAVE");

    h[12..16].copy_from_slice(b"fmt ");
    h[16..20].copy_from_slice(&16u32.to_le_bytes());
    h[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    h[22..24].copy_from_slice(&channels.to_le_bytes());
    h[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    h[28..32].copy_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    h[32..34].copy_from_slice(&block_align.to_le_bytes());
    h[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    h[36..40].copy_from_slice(b"data");
    h[40..44].copy_from_slice(&data_size.to_le_bytes());
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes(bytes[at..at + 2].try_into().unwrap())
    }

    #[test]
    fn stereo_header_fields() {
        let wav = samples_to_wav(&[1, -1, 2, -2], 2, 44100);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + 8);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u16_at(&wav, 22), 2);
        assert_eq!(u32_at(&wav, 24), 44100);
        assert_eq!(u32_at(&wav, 28), 44100 * 4);
        assert_eq!(u16_at(&wav, 32), 4);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 8);
        assert_eq!(&wav[44..], &[1, 0, 0xff, 0xff, 2, 0, 0xfe, 0xff]);
    }

    #[test]
    fn mono_block_align() {
        let wav = samples_to_wav(&[0; 10], 1, 22050);
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 28), 22050 * 2);
        assert_eq!(u16_at(&wav, 32), 2);
        assert_eq!(wav.len(), 44 + 20);
    }

    #[test]
    fn streamed_matches_in_memory() {
        let samples: Vec<i16> = (0..5000).map(|i| (i * 13) as i16).collect();
        let mut streamed = Vec::new();
        write_wav(&mut streamed, &samples, 2, 48000).unwrap();
        assert_eq!(streamed, samples_to_wav(&samples, 2, 48000));
    }
}
