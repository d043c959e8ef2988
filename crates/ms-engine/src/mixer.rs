//! Output mixing: four channel samples in, one output frame out.

use core::fmt;
use core::str::FromStr;

use ms_format::CHANNELS;

/// How the four channels are folded into the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MixMode {
    /// Average of all channels, one sample per frame
    Mono,
    /// Amiga LRRL panning blended 3:1 toward the opposite side
    #[default]
    StereoSoft,
    /// Amiga LRRL panning: channels 0+3 left, 1+2 right
    StereoHard,
}

impl MixMode {
    /// Output samples per frame.
    pub const fn channels(self) -> usize {
        match self {
            MixMode::Mono => 1,
            MixMode::StereoSoft | MixMode::StereoHard => 2,
        }
    }
}

impl fmt::Display for MixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MixMode::Mono => "mono",
            MixMode::StereoSoft => "soft",
            MixMode::StereoHard => "hard",
        })
    }
}

/// Error returned when a mix mode name is not recognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseMixModeError;

impl fmt::Display for ParseMixModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected one of: mono, soft, hard")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseMixModeError {}

impl FromStr for MixMode {
    type Err = ParseMixModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mono" => Ok(MixMode::Mono),
            "soft" | "stereo" | "stereo-soft" => Ok(MixMode::StereoSoft),
            "hard" | "stereo-hard" => Ok(MixMode::StereoHard),
            _ => Err(ParseMixModeError),
        }
    }
}

/// A mixing strategy, resolved at compile time inside the render loop.
pub(crate) trait Mixdown {
    const CHANNELS: usize;

    /// Write one frame (`CHANNELS` samples) into `out`.
    fn mix(samples: [i16; CHANNELS], out: &mut [i16]);
}

pub(crate) struct Mono;
pub(crate) struct HardStereo;
pub(crate) struct SoftStereo;

impl Mixdown for Mono {
    const CHANNELS: usize = 1;

    #[inline]
    fn mix(samples: [i16; CHANNELS], out: &mut [i16]) {
        let sum: i32 = samples.iter().map(|&s| s as i32).sum();
        out[0] = (sum / 4) as i16;
    }
}

impl Mixdown for HardStereo {
    const CHANNELS: usize = 2;

    #[inline]
    fn mix(samples: [i16; CHANNELS], out: &mut [i16]) {
        let (left, right) = pairs(samples);
        out[0] = (left / 2) as i16;
        out[1] = (right / 2) as i16;
    }
}

impl Mixdown for SoftStereo {
    const CHANNELS: usize = 2;

    #[inline]
    fn mix(samples: [i16; CHANNELS], out: &mut [i16]) {
        let (left, right) = pairs(samples);
        out[0] = ((left * 3 + right) / 8) as i16;
        out[1] = ((right * 3 + left) / 8) as i16;
    }
}

/// Left (0+3) and right (1+2) channel sums.
#[inline]
fn pairs(s: [i16; CHANNELS]) -> (i32, i32) {
    (s[0] as i32 + s[3] as i32, s[1] as i32 + s[2] as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<M: Mixdown>(samples: [i16; CHANNELS]) -> [i16; 2] {
        let mut out = [0; 2];
        M::mix(samples, &mut out[..M::CHANNELS]);
        out
    }

    #[test]
    fn mono_averages() {
        assert_eq!(run::<Mono>([100, 200, 300, 400])[0], 250);
        assert_eq!(run::<Mono>([i16::MAX; 4])[0], i16::MAX);
        assert_eq!(run::<Mono>([i16::MIN; 4])[0], i16::MIN);
        assert_eq!(run::<Mono>([-3, 0, 0, 0])[0], 0);
    }

    #[test]
    fn hard_stereo_is_lrrl() {
        assert_eq!(run::<HardStereo>([100, 0, 0, 300]), [200, 0]);
        assert_eq!(run::<HardStereo>([0, 100, 300, 0]), [0, 200]);
        assert_eq!(run::<HardStereo>([i16::MIN, i16::MIN, i16::MIN, i16::MIN]), [i16::MIN; 2]);
    }

    #[test]
    fn soft_stereo_bleeds_a_quarter() {
        assert_eq!(run::<SoftStereo>([800, 0, 0, 0]), [300, 100]);
        assert_eq!(run::<SoftStereo>([0, 0, 800, 0]), [100, 300]);
        assert_eq!(run::<SoftStereo>([i16::MAX; 4]), [i16::MAX; 2]);
    }

    #[test]
    fn mode_channels() {
        assert_eq!(MixMode::Mono.channels(), 1);
        assert_eq!(MixMode::StereoSoft.channels(), 2);
        assert_eq!(MixMode::StereoHard.channels(), 2);
    }

    #[test]
    fn parse_round_trips_display() {
        for mode in [MixMode::Mono, MixMode::StereoSoft, MixMode::StereoHard] {
            let name = alloc::format!("{mode}");
            assert_eq!(name.parse::<MixMode>(), Ok(mode));
        }
        assert_eq!("quad".parse::<MixMode>(), Err(ParseMixModeError));
    }
}
