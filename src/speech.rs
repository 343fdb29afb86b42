//! Boundary to whatever supplies answer transcripts. Transcripts could come
//! from a speech recognizer; the terminal build types answers on the
//! keyboard. The session only cares about authorization and the capture
//! lifecycle, so this is a small trait the binary and the tests implement
//! differently.

pub trait TranscriptSource {
    /// Whether the answer channel may be used at all. A denied channel makes
    /// `GameSession::start` fail with a permission error.
    fn is_authorized(&self) -> bool;

    /// Begin delivering transcripts. Called on every transition into Started.
    fn start_capture(&mut self) {}

    /// Stop delivering transcripts. Called on pause/stop/end.
    fn stop_capture(&mut self) {}

    /// Restart capture after an answer so the transcript buffer is fresh.
    /// Fired by the debounced re-arm roughly one second after a submission.
    fn rearm(&mut self) {}
}

/// Keyboard-backed source used by the TUI: typed text is handed straight to
/// `GameSession::submit_answer`, so capture management is a no-op and the
/// channel is always authorized.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardTranscriptSource;

impl TranscriptSource for KeyboardTranscriptSource {
    fn is_authorized(&self) -> bool {
        true
    }
}

/// A source whose authorization was refused. Used in tests and as the
/// fallback when a real recognizer reports no permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedTranscriptSource;

impl TranscriptSource for DeniedTranscriptSource {
    fn is_authorized(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_source_is_authorized() {
        assert!(KeyboardTranscriptSource.is_authorized());
    }

    #[test]
    fn test_denied_source_is_not() {
        assert!(!DeniedTranscriptSource.is_authorized());
    }
}
