//! Period and tempo conversion for sample playback.
//!
//! Playback positions are 20.12 fixed-point byte offsets into the
//! instrument's sample data. A period is the Amiga hardware's sample
//! interval: smaller periods play faster (higher pitch).

/// Fractional bits of a playback position.
pub const FRACTION_BITS: u32 = 12;

/// One whole sample in fixed point.
pub const FRACTION_ONE: u32 = 1 << FRACTION_BITS;

/// Mask for the fractional part of a playback position.
pub const FRACTION_MASK: u32 = FRACTION_ONE - 1;

/// Lowest allowed period (highest pitch, B-3 in Amiga notation).
pub const PERIOD_MIN: u16 = 113;

/// Highest allowed period (lowest pitch, C-1 in Amiga notation).
pub const PERIOD_MAX: u16 = 856;

/// Period 254 (A-2) plays a 14 kHz sample at its recorded rate.
const REFERENCE_PERIOD: u64 = 254;
const REFERENCE_RATE: u64 = 14_000;

/// Tempo at which one tick is 1/50 s.
pub const DEFAULT_TEMPO: u8 = 125;

/// Ticks per row at the start of a song.
pub const DEFAULT_SPEED: u8 = 6;

/// Period-independent part of the phase increment for an output rate.
///
/// `phase_increment(phase_base(rate), p)` is exactly
/// `(4096 * 254 * 14000 / rate) / p`.
pub fn phase_base(sample_rate: u32) -> u32 {
    if sample_rate == 0 {
        return 0;
    }
    let base = (FRACTION_ONE as u64 * REFERENCE_PERIOD * REFERENCE_RATE) / sample_rate as u64;
    base.min(u32::MAX as u64) as u32
}

/// Convert a period to a 20.12 fixed-point increment per output sample.
#[inline]
pub fn phase_increment(base: u32, period: u16) -> u32 {
    if period == 0 {
        return 0;
    }
    base / period as u32
}

/// Output samples per tick: tempo 125 gives 50 ticks per second.
pub fn samples_per_tick(tempo: u8, sample_rate: u32) -> u32 {
    if tempo == 0 {
        return 0;
    }
    ((DEFAULT_TEMPO as u64 * sample_rate as u64 / 50) / tempo as u64) as u32
}

/// Clamp a period to the valid MOD range.
pub fn clamp_period(period: u16) -> u16 {
    period.clamp(PERIOD_MIN, PERIOD_MAX)
}
