//! Audio output trait and error types.

use ms_engine::Frame;

/// Error type for audio operations.
#[derive(Debug)]
pub enum AudioError {
    /// Failed to query or open the device
    DeviceInit(String),
    /// Failed to create the output stream
    StreamCreate(String),
    /// Failed to start or pause the stream
    Playback(String),
    /// No output device available
    NoDevice,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::DeviceInit(msg) => write!(f, "device init error: {}", msg),
            AudioError::StreamCreate(msg) => write!(f, "stream create error: {}", msg),
            AudioError::Playback(msg) => write!(f, "playback error: {}", msg),
            AudioError::NoDevice => write!(f, "no audio output device available"),
        }
    }
}

impl std::error::Error for AudioError {}

/// A sink for rendered frames.
pub trait AudioOutput {
    /// Rate the output consumes frames at; players must render at this rate.
    fn sample_rate(&self) -> u32;

    /// Queue as many frames as fit without blocking. Returns how many were
    /// taken.
    fn write(&mut self, frames: &[Frame]) -> usize;

    /// Queue all frames, yielding while the output is full.
    fn write_all(&mut self, mut frames: &[Frame]) {
        while !frames.is_empty() {
            let n = self.write(frames);
            frames = &frames[n..];
            if n == 0 {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        }
    }

    fn start(&mut self) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError>;
}
