//! Speech capture state machine
//!
//! A recognizer reports lifecycle and result events; `SpeechCapture` turns
//! them into input-buffer updates and idle/capturing transitions. Capture
//! never submits on its own: the learner still presses send.

use crate::conversation::SpeechEventSender;
use crate::{EchoesError, Result};
use std::fmt;

pub const DEFAULT_LOCALE: &str = "en-US";

/// Recognizer settings passed on every start request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    /// BCP 47 language tag the recognizer listens for
    pub locale: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl CaptureConfig {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.locale.trim().is_empty() {
            return Err(EchoesError::Config("Capture locale cannot be empty".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing,
}

impl CaptureState {
    pub fn is_capturing(&self) -> bool {
        matches!(self, CaptureState::Capturing)
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Capturing => write!(f, "Capturing"),
        }
    }
}

/// Conditions a recognizer can report
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechErrorKind {
    NoSpeech,
    Aborted,
    NotAllowed,
    AudioCapture,
    Network,
    Other(String),
}

impl SpeechErrorKind {
    /// Map a recognizer error code (`no-speech`, `not-allowed`, ...)
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => SpeechErrorKind::NoSpeech,
            "aborted" => SpeechErrorKind::Aborted,
            "not-allowed" | "service-not-allowed" => SpeechErrorKind::NotAllowed,
            "audio-capture" => SpeechErrorKind::AudioCapture,
            "network" => SpeechErrorKind::Network,
            other => SpeechErrorKind::Other(other.to_string()),
        }
    }

    /// Silence and user aborts are routine and never shown to the learner
    pub fn is_benign(&self) -> bool {
        matches!(self, SpeechErrorKind::NoSpeech | SpeechErrorKind::Aborted)
    }
}

impl fmt::Display for SpeechErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechErrorKind::NoSpeech => write!(f, "no-speech"),
            SpeechErrorKind::Aborted => write!(f, "aborted"),
            SpeechErrorKind::NotAllowed => write!(f, "not-allowed"),
            SpeechErrorKind::AudioCapture => write!(f, "audio-capture"),
            SpeechErrorKind::Network => write!(f, "network"),
            SpeechErrorKind::Other(code) => write!(f, "{}", code),
        }
    }
}

/// Events produced by a speech recognizer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechInputEvent {
    Started,
    /// New segments since the previous result
    Result {
        finals: Vec<String>,
        interims: Vec<String>,
    },
    End,
    Error(SpeechErrorKind),
}

impl SpeechInputEvent {
    pub fn finals(segments: &[&str]) -> Self {
        SpeechInputEvent::Result {
            finals: segments.iter().map(|s| s.to_string()).collect(),
            interims: Vec::new(),
        }
    }

    pub fn interims(segments: &[&str]) -> Self {
        SpeechInputEvent::Result {
            finals: Vec::new(),
            interims: segments.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A result with no final text; the next update supersedes it
    pub fn is_interim_only(&self) -> bool {
        matches!(self, SpeechInputEvent::Result { finals, .. } if finals.is_empty())
    }
}

/// Control surface of a speech-to-text engine
///
/// Results are delivered asynchronously as `SpeechInputEvent`s through the
/// `events` sender handed over on `start`.
pub trait SpeechRecognizer: Send {
    /// Begin continuous recognition in `locale`; an error means the request
    /// was refused (no microphone, permission denied, ...)
    fn start(&mut self, locale: &str, events: SpeechEventSender) -> Result<()>;

    /// Stop and flush pending results
    fn stop(&mut self);

    /// Stop and discard pending results
    fn abort(&mut self);
}

/// What a capture event changed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Unchanged,
    BufferUpdated(String),
    Stopped,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct SpeechCapture {
    state: CaptureState,
    finalized: String,
}

impl SpeechCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_capturing(&self) -> bool {
        self.state.is_capturing()
    }

    /// idle -> capturing, after the recognizer accepted the start request
    pub fn begin(&mut self) {
        self.state = CaptureState::Capturing;
        self.finalized.clear();
    }

    /// capturing -> idle; returns whether a capture was actually running
    pub fn finish(&mut self) -> bool {
        let was_capturing = self.is_capturing();
        self.state = CaptureState::Idle;
        was_capturing
    }

    pub fn on_event(&mut self, event: SpeechInputEvent) -> CaptureOutcome {
        match event {
            SpeechInputEvent::Started => CaptureOutcome::Unchanged,

            SpeechInputEvent::Result { finals, interims } => {
                if !self.is_capturing() {
                    // Late result from a capture that already ended
                    return CaptureOutcome::Unchanged;
                }
                for segment in finals {
                    self.finalized.push_str(&segment);
                }
                let interim: String = interims.concat();
                CaptureOutcome::BufferUpdated(format!("{}{}", self.finalized.trim(), interim))
            }

            SpeechInputEvent::End => {
                if self.finish() {
                    CaptureOutcome::Stopped
                } else {
                    CaptureOutcome::Unchanged
                }
            }

            SpeechInputEvent::Error(kind) => {
                let was_capturing = self.finish();
                if kind.is_benign() {
                    if was_capturing {
                        CaptureOutcome::Stopped
                    } else {
                        CaptureOutcome::Unchanged
                    }
                } else {
                    CaptureOutcome::Failed(format!(
                        "Speech recognition error: {}. Please ensure you've granted microphone permissions.",
                        kind
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capturing() -> SpeechCapture {
        let mut capture = SpeechCapture::new();
        capture.begin();
        capture
    }

    #[test]
    fn test_interims_are_replaced_not_accumulated() {
        let mut capture = capturing();
        assert_eq!(
            capture.on_event(SpeechInputEvent::interims(&["I li"])),
            CaptureOutcome::BufferUpdated("I li".into())
        );
        assert_eq!(
            capture.on_event(SpeechInputEvent::interims(&["I like"])),
            CaptureOutcome::BufferUpdated("I like".into())
        );
    }

    #[test]
    fn test_finals_accumulate_across_results() {
        let mut capture = capturing();
        capture.on_event(SpeechInputEvent::finals(&["I like cats"]));
        let outcome = capture.on_event(SpeechInputEvent::Result {
            finals: vec![" and dogs".into()],
            interims: vec![" too".into()],
        });
        assert_eq!(
            outcome,
            CaptureOutcome::BufferUpdated("I like cats and dogs too".into())
        );
    }

    #[test]
    fn test_begin_resets_finalized_text() {
        let mut capture = capturing();
        capture.on_event(SpeechInputEvent::finals(&["old words"]));
        capture.finish();
        capture.begin();
        assert_eq!(
            capture.on_event(SpeechInputEvent::finals(&["new"])),
            CaptureOutcome::BufferUpdated("new".into())
        );
    }

    #[test]
    fn test_results_while_idle_are_ignored() {
        let mut capture = SpeechCapture::new();
        assert_eq!(
            capture.on_event(SpeechInputEvent::finals(&["stray"])),
            CaptureOutcome::Unchanged
        );
    }

    #[test]
    fn test_end_returns_to_idle_without_submitting() {
        let mut capture = capturing();
        assert_eq!(capture.on_event(SpeechInputEvent::End), CaptureOutcome::Stopped);
        assert_eq!(capture.state(), CaptureState::Idle);
        assert_eq!(capture.on_event(SpeechInputEvent::End), CaptureOutcome::Unchanged);
    }

    #[test]
    fn test_benign_errors_are_silent() {
        for kind in [SpeechErrorKind::NoSpeech, SpeechErrorKind::Aborted] {
            let mut capture = capturing();
            assert_eq!(
                capture.on_event(SpeechInputEvent::Error(kind)),
                CaptureOutcome::Stopped
            );
            assert!(!capture.is_capturing());
        }
    }

    #[test]
    fn test_hard_errors_are_surfaced() {
        let mut capture = capturing();
        match capture.on_event(SpeechInputEvent::Error(SpeechErrorKind::NotAllowed)) {
            CaptureOutcome::Failed(message) => assert!(message.contains("not-allowed")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!capture.is_capturing());
    }

    #[test]
    fn test_capture_config() {
        assert_eq!(CaptureConfig::default().locale, "en-US");
        assert!(CaptureConfig::new("").validate().is_err());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SpeechErrorKind::from_code("no-speech"), SpeechErrorKind::NoSpeech);
        assert_eq!(
            SpeechErrorKind::from_code("service-not-allowed"),
            SpeechErrorKind::NotAllowed
        );
        assert_eq!(
            SpeechErrorKind::from_code("bad-grammar"),
            SpeechErrorKind::Other("bad-grammar".into())
        );
    }

    #[test]
    fn test_only_pure_interims_are_droppable() {
        assert!(SpeechInputEvent::interims(&[" hel"]).is_interim_only());
        assert!(!SpeechInputEvent::finals(&[" hello"]).is_interim_only());
        assert!(!SpeechInputEvent::Result {
            finals: vec![" cats".into()],
            interims: vec![" and".into()],
        }
        .is_interim_only());
        assert!(!SpeechInputEvent::End.is_interim_only());
    }
}
