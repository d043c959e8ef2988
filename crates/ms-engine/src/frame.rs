//! Stereo frames for device output.

use crate::mixer::MixMode;

/// One stereo output frame (16-bit signed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Same value on both sides.
    pub const fn mono(value: i16) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Build a frame from one frame's worth of rendered samples. Mono
    /// samples are duplicated to both sides; a short chunk is silence.
    pub fn from_samples(chunk: &[i16], mode: MixMode) -> Self {
        match (mode, chunk) {
            (MixMode::Mono, [value, ..]) => Self::mono(*value),
            (_, [left, right, ..]) => Self {
                left: *left,
                right: *right,
            },
            _ => Self::silence(),
        }
    }

    /// Normalized `f32` pair for float device formats.
    pub fn to_f32(self) -> (f32, f32) {
        (self.left as f32 / 32768.0, self.right as f32 / 32768.0)
    }
}

/// Iterate over the frames of an interleaved render buffer.
pub fn frames(samples: &[i16], mode: MixMode) -> impl Iterator<Item = Frame> + '_ {
    samples
        .chunks_exact(mode.channels())
        .map(move |chunk| Frame::from_samples(chunk, mode))
}
