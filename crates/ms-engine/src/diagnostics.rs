//! Diagnostics for effects the engine does not emulate.
//!
//! Unsupported effects never stop playback. The engine reports them to a
//! [`DiagnosticSink`] chosen by the caller and carries on.

use core::fmt;

/// Why an effect was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unsupported {
    /// 0xy with a nonzero parameter
    Arpeggio,
    /// Exy filter/extended commands
    Extended,
    /// Fxx >= 32 while tempo support is disabled
    TempoDisabled,
    /// Dxy whose decoded row is past 63
    PatternBreakRow,
    /// Commands 3-9
    Unknown,
}

/// An ignored effect on one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub channel: u8,
    pub command: u8,
    pub value: u8,
    pub reason: Unsupported,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channel {}: unsupported effect {:X}{:02X} ({:?})",
            self.channel, self.command, self.value, self.reason
        )
    }
}

/// Receiver for diagnostics. Called from the render path, so
/// implementations must not block.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::debug!("{}", diagnostic);
    }
}

/// Discards diagnostics.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// Collects diagnostics until full, then drops the rest.
impl<const N: usize> DiagnosticSink for heapless::Vec<Diagnostic, N> {
    fn report(&mut self, diagnostic: Diagnostic) {
        let _ = self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn arpeggio() -> Diagnostic {
        Diagnostic {
            channel: 2,
            command: 0x0,
            value: 0x37,
            reason: Unsupported::Arpeggio,
        }
    }

    #[test]
    fn display_names_channel_and_effect() {
        assert_eq!(
            arpeggio().to_string(),
            "channel 2: unsupported effect 037 (Arpeggio)"
        );
    }

    #[test]
    fn heapless_sink_drops_when_full() {
        let mut sink: heapless::Vec<Diagnostic, 2> = heapless::Vec::new();
        for _ in 0..5 {
            sink.report(arpeggio());
        }
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn log_and_null_sinks_accept_reports() {
        LogSink.report(arpeggio());
        NullSink.report(arpeggio());
    }
}
