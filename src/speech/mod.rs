//! Speech capture and playback
//!
//! This module provides:
//! - The capture state machine fed by a `SpeechRecognizer`
//! - A recognizer that reads transcripts from an external program
//! - The `SpeechOutput` sink and a system-TTS implementation

pub mod capture;
pub mod listener;
pub mod output;

// Re-export commonly used types
pub use capture::{
    CaptureConfig, CaptureOutcome, CaptureState, SpeechCapture, SpeechErrorKind, SpeechInputEvent,
    SpeechRecognizer, DEFAULT_LOCALE,
};
pub use listener::{CommandRecognizer, ListenerConfig};
pub use output::{
    dispatch_utterance, normalize_for_speech, CommandSpeaker, SpeakerCommand, SpeakerConfig,
    SpeechOutput,
};
