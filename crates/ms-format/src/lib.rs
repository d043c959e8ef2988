//! Format decoding for modstream.
//!
//! Interprets a caller-owned byte buffer as a 4-channel SoundTracker
//! (15 instruments) or ProTracker (31 instruments, `M.K.` tag) module.
//! Decoding never copies sample or pattern data: every view returned
//! here borrows the input buffer.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "builder")]
pub mod builder;
mod cell;
mod effect;
mod header;
mod instrument;
mod module;

use core::fmt;

pub use cell::Cell;
pub use effect::{break_row, Effect};
pub use instrument::Instrument;
pub use module::{Module, ModuleFormat};

/// Number of channels in every supported module.
pub const CHANNELS: usize = 4;

/// Rows in one pattern.
pub const ROWS_PER_PATTERN: usize = 64;

/// Bytes in one pattern (64 rows x 4 channels x 4-byte cells).
pub const PATTERN_BYTES: usize = ROWS_PER_PATTERN * CHANNELS * 4;

/// Slots in the sequence (order) table.
pub const SEQUENCE_SLOTS: usize = 128;

/// Maximum instrument count (ProTracker layout).
pub const MAX_INSTRUMENTS: usize = 31;

/// Error type for module decoding.
///
/// Every variant describes a buffer that cannot be played without
/// reading outside of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Buffer shorter than the fixed header region
    TooSmall { needed: usize, actual: usize },
    /// Sequence length byte outside 1..=128
    InvalidLength(u8),
    /// Pattern data referenced by the sequence runs past the buffer
    PatternsOutOfBounds {
        patterns: usize,
        needed: usize,
        actual: usize,
    },
    /// A fixed-size header record could not be read
    Header { offset: usize },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::TooSmall { needed, actual } => write!(
                f,
                "Module too small: header needs {} bytes, buffer has {}",
                needed, actual
            ),
            FormatError::InvalidLength(len) => {
                write!(f, "Invalid sequence length: {} (expected 1-128)", len)
            }
            FormatError::PatternsOutOfBounds {
                patterns,
                needed,
                actual,
            } => write!(
                f,
                "{} patterns need {} bytes, buffer has {}",
                patterns, needed, actual
            ),
            FormatError::Header { offset } => {
                write!(f, "Unreadable header record at offset 0x{:x}", offset)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FormatError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn error_display() {
        assert_eq!(
            FormatError::TooSmall { needed: 600, actual: 12 }.to_string(),
            "Module too small: header needs 600 bytes, buffer has 12"
        );
        assert_eq!(
            FormatError::InvalidLength(0).to_string(),
            "Invalid sequence length: 0 (expected 1-128)"
        );
        assert_eq!(
            FormatError::Header { offset: 0x14 }.to_string(),
            "Unreadable header record at offset 0x14"
        );
    }

    #[test]
    fn pattern_size_matches_layout() {
        assert_eq!(PATTERN_BYTES, 1024);
    }
}
