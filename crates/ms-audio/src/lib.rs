//! Live audio output for modstream.

mod cpal_backend;
mod traits;

pub use cpal_backend::CpalOutput;
pub use traits::{AudioError, AudioOutput};

#[cfg(test)]
mod tests {
    use super::*;
    use ms_engine::Frame;

    /// Takes at most `room` frames per call.
    struct Trickle {
        room: usize,
        taken: Vec<Frame>,
    }

    impl AudioOutput for Trickle {
        fn sample_rate(&self) -> u32 {
            8000
        }

        fn write(&mut self, frames: &[Frame]) -> usize {
            let n = frames.len().min(self.room);
            self.taken.extend_from_slice(&frames[..n]);
            n
        }

        fn start(&mut self) -> Result<(), AudioError> {
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
    }

    #[test]
    fn write_all_delivers_everything_in_order() {
        let frames: Vec<Frame> = (0..10).map(Frame::mono).collect();
        let mut out = Trickle {
            room: 3,
            taken: Vec::new(),
        };
        out.write_all(&frames);
        assert_eq!(out.taken, frames);
    }

    #[test]
    fn errors_display() {
        assert_eq!(
            AudioError::NoDevice.to_string(),
            "no audio output device available"
        );
        assert!(AudioError::StreamCreate("busy".into())
            .to_string()
            .contains("busy"));
    }
}
