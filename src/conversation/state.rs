//! Session state shared between the orchestrator loop and front ends
//!
//! The loop task is the only writer; everything else reads snapshots.

use super::mode::InteractionMode;
use super::stats::SessionSummary;
use crate::messages::{Message, Mood, Transcript};
use crate::speech::{CaptureState, SpeechInputEvent};
use crate::EchoesError;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Commands accepted by the orchestrator loop
#[derive(Debug)]
pub enum SessionCommand {
    /// Submit `text` as the learner's next turn
    Submit(String),

    /// Submit whatever is in the input buffer
    SubmitInput,

    /// Replace the input buffer (typing)
    SetInput(String),

    /// Start or stop speech capture
    ToggleCapture,

    /// Event reported by the speech recognizer
    Speech(SpeechInputEvent),

    /// Close the reflective prompt
    DismissReflection,

    /// Tear the session down and report its summary
    End(oneshot::Sender<SessionSummary>),
}

/// Why a submission was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A reply for the previous turn is still being composed
    Composing,
}

/// Events emitted by the orchestrator loop
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A message was added to the transcript
    MessageAppended(Message),

    /// The input buffer changed
    InputChanged(String),

    /// The "AI is thinking" indicator changed
    ComposingChanged(bool),

    SubmissionRejected(RejectReason),

    CaptureChanged(CaptureState),

    /// A reflective question is on screen
    ReflectionShown(String),

    ReflectionDismissed,

    /// The reflection generator failed; nothing was appended
    ReflectionFailed(String),

    /// The response generator failed and the fallback reply was used
    GeneratorFailed(String),

    /// Non-blocking message for the learner
    Notice(String),

    /// A turn cycle finished, successfully or not
    TurnCompleted { user_turns: usize },

    SessionEnded(SessionSummary),
}

/// Everything a front end needs to render the session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: Uuid,
    pub mode: InteractionMode,
    pub transcript: Transcript,
    pub input: String,
    pub composing: bool,
    pub capture: CaptureState,
    pub reflection: Option<String>,
    /// Running whitespace-token count across user messages
    pub user_word_count: usize,
    pub started_at: DateTime<Utc>,
    pub ended: bool,
}

impl SessionState {
    pub fn new(mode: InteractionMode) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            mode,
            transcript: Transcript::new(),
            input: String::new(),
            composing: false,
            capture: CaptureState::Idle,
            reflection: None,
            user_word_count: 0,
            started_at: Utc::now(),
            ended: false,
        }
    }

    pub fn user_turns(&self) -> usize {
        self.transcript.user_count()
    }

    /// Mood of the most recent AI message
    pub fn current_mood(&self) -> Mood {
        self.transcript
            .messages()
            .iter()
            .rev()
            .find_map(|m| m.mood)
            .unwrap_or_default()
    }

    /// Header line shown above the transcript
    pub fn status_line(&self) -> String {
        if self.composing {
            "AI is thinking...".to_string()
        } else {
            format!("AI is feeling {}", self.current_mood())
        }
    }
}

/// Thread-safe handle on the session state
#[derive(Debug, Clone)]
pub struct SharedSessionState {
    inner: Arc<RwLock<SessionState>>,
}

impl SharedSessionState {
    pub fn new(state: SessionState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.read().clone()
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.read().transcript.messages().to_vec()
    }

    pub fn input(&self) -> String {
        self.inner.read().input.clone()
    }

    pub fn is_composing(&self) -> bool {
        self.inner.read().composing
    }

    pub fn capture_state(&self) -> CaptureState {
        self.inner.read().capture
    }

    pub fn reflection(&self) -> Option<String> {
        self.inner.read().reflection.clone()
    }

    pub fn user_turns(&self) -> usize {
        self.inner.read().user_turns()
    }

    pub fn is_ended(&self) -> bool {
        self.inner.read().ended
    }
}

/// Out-of-band errors that never interrupt the session
#[derive(Debug, Clone)]
pub struct SessionError {
    pub session_id: Uuid,
    pub error: EchoesError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = SessionState::new(InteractionMode::Peer);
        assert_eq!(state.mode, InteractionMode::Peer);
        assert!(state.transcript.is_empty());
        assert!(!state.composing);
        assert_eq!(state.capture, CaptureState::Idle);
        assert_eq!(state.status_line(), "AI is feeling calm");
    }

    #[test]
    fn test_status_line_follows_latest_mood() {
        let mut state = SessionState::new(InteractionMode::Agentic);
        state.transcript.push_ai("Hello", Mood::Calm);
        state.transcript.push_user("Hi");
        state.transcript.push_ai("Tell me more!", Mood::Curious);
        assert_eq!(state.current_mood(), Mood::Curious);

        state.composing = true;
        assert_eq!(state.status_line(), "AI is thinking...");
    }

    #[test]
    fn test_shared_state_update_is_visible() {
        let shared = SharedSessionState::new(SessionState::new(InteractionMode::Agentic));
        let reader = shared.clone();
        shared.update(|s| s.input = "draft".into());
        assert_eq!(reader.input(), "draft");
        assert_eq!(reader.snapshot().input, "draft");
    }
}
