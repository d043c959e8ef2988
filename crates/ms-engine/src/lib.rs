//! Allocation-free playback engine for four-channel MOD modules.
//!
//! A [`Player`] borrows a decoded [`Module`](ms_format::Module) and fills
//! caller-supplied buffers with interleaved 16-bit PCM. Progress is driven
//! entirely by [`Player::render`]; nothing runs in the background.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod channel;
mod diagnostics;
mod effects;
mod frame;
pub mod frequency;
mod mixer;
mod pcm;
mod player;
mod sequencer;
mod state;

pub use channel::{ChannelState, LoopState, PitchSlide};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, NullSink, Unsupported};
pub use frame::{frames, Frame};
pub use mixer::{MixMode, ParseMixModeError};
pub use pcm::{encode_pcm, ByteOrder};
pub use player::{PlaybackPosition, Player};
pub use sequencer::TickOutcome;
pub use state::{PlayerConfig, PlayerOption, PlayerState, DEFAULT_SAMPLE_RATE};
