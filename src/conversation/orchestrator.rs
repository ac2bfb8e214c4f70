//! Conversation orchestrator
//!
//! One event loop task per session owns the transcript and every counter.
//! Generator calls for a turn run on their own task and report back through
//! an internal channel, so the loop keeps serving capture events, typing and
//! teardown while the hosted model is thinking.

use super::config::SessionConfig;
use super::state::{
    RejectReason, SessionCommand, SessionError, SessionEvent, SessionState, SharedSessionState,
};
use super::stats::{self, SessionSummary, SkipReason, StatsWrite};
use crate::llm::{
    GeneratedReflection, GeneratedReply, ReflectionGenerator, ReflectionRequest,
    ResponseGenerator, ResponseRequest,
};
use crate::messages::{HistoryEntry, Mood, Speaker};
use crate::profile::StatsStore;
use crate::speech::{
    dispatch_utterance, CaptureOutcome, CaptureState, SpeechCapture, SpeechInputEvent,
    SpeechOutput, SpeechRecognizer,
};
use crate::{EchoesError, Result};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Reply appended when the response generator fails
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble connecting. Please try again in a moment.";

const CAPTURE_UNAVAILABLE: &str =
    "Speech recognition is not available here. Please type your message instead.";

/// External services a session talks to
pub struct Collaborators {
    pub responder: Arc<dyn ResponseGenerator>,
    pub reflector: Arc<dyn ReflectionGenerator>,
    pub speech_output: Option<Arc<dyn SpeechOutput>>,
    pub recognizer: Option<Box<dyn SpeechRecognizer>>,
    pub stats_store: Option<Arc<dyn StatsStore>>,
}

impl Collaborators {
    pub fn new(
        responder: Arc<dyn ResponseGenerator>,
        reflector: Arc<dyn ReflectionGenerator>,
    ) -> Self {
        Self {
            responder,
            reflector,
            speech_output: None,
            recognizer: None,
            stats_store: None,
        }
    }

    pub fn with_speech_output(mut self, output: Arc<dyn SpeechOutput>) -> Self {
        self.speech_output = Some(output);
        self
    }

    pub fn with_recognizer(mut self, recognizer: Box<dyn SpeechRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_stats_store(mut self, store: Arc<dyn StatsStore>) -> Self {
        self.stats_store = Some(store);
        self
    }
}

/// Delivers recognizer events into a running session
#[derive(Clone)]
pub struct SpeechEventSender {
    command_tx: mpsc::Sender<SessionCommand>,
}

impl SpeechEventSender {
    /// Deliver from a recognizer's own thread
    ///
    /// Interim-only results are dropped when the session is backed up.
    /// Everything else waits for room, so this must not be called from
    /// inside the tokio runtime; use `send_async` there.
    pub fn send(&self, event: SpeechInputEvent) -> Result<()> {
        let command = SessionCommand::Speech(event);
        let sent = if command_is_droppable(&command) {
            self.command_tx.try_send(command).map_err(|e| e.to_string())
        } else {
            self.command_tx.blocking_send(command).map_err(|e| e.to_string())
        };
        sent.map_err(|e| EchoesError::Channel(format!("Failed to deliver speech event: {}", e)))
    }

    pub async fn send_async(&self, event: SpeechInputEvent) -> Result<()> {
        self.command_tx
            .send(SessionCommand::Speech(event))
            .await
            .map_err(|e| EchoesError::Channel(format!("Failed to deliver speech event: {}", e)))
    }
}

fn command_is_droppable(command: &SessionCommand) -> bool {
    matches!(command, SessionCommand::Speech(event) if event.is_interim_only())
}

/// Handle for driving a session from a front end
pub struct OrchestratorHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    event_rx: mpsc::UnboundedReceiver<SessionEvent>,
    error_rx: mpsc::UnboundedReceiver<SessionError>,
    state: SharedSessionState,
}

impl OrchestratorHandle {
    /// Send a command to the orchestrator
    pub async fn send_command(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| EchoesError::Channel(format!("Failed to send command: {}", e)))
    }

    pub async fn submit_text(&self, text: impl Into<String>) -> Result<()> {
        self.send_command(SessionCommand::Submit(text.into())).await
    }

    /// Submit the current input buffer (the send button)
    pub async fn submit_input(&self) -> Result<()> {
        self.send_command(SessionCommand::SubmitInput).await
    }

    pub async fn set_input(&self, text: impl Into<String>) -> Result<()> {
        self.send_command(SessionCommand::SetInput(text.into())).await
    }

    pub async fn toggle_capture(&self) -> Result<()> {
        self.send_command(SessionCommand::ToggleCapture).await
    }

    pub async fn dismiss_reflection(&self) -> Result<()> {
        self.send_command(SessionCommand::DismissReflection).await
    }

    /// Tear the session down
    ///
    /// Returns once speech and capture are stopped; a statistics write, if
    /// any, is still in flight and reports failures on the error channel.
    pub async fn end_session(&self) -> Result<SessionSummary> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send_command(SessionCommand::End(reply_tx)).await?;
        reply_rx.await.map_err(|_| {
            EchoesError::Channel("Session loop exited before reporting its summary".into())
        })
    }

    pub fn speech_event_sender(&self) -> SpeechEventSender {
        SpeechEventSender {
            command_tx: self.command_tx.clone(),
        }
    }

    pub fn state(&self) -> &SharedSessionState {
        &self.state
    }

    /// Try to receive an event from the orchestrator
    pub fn try_recv_event(&mut self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }

    pub async fn recv_event(&mut self) -> Option<SessionEvent> {
        self.event_rx.recv().await
    }

    pub fn try_recv_error(&mut self) -> Option<SessionError> {
        self.error_rx.try_recv().ok()
    }

    pub async fn recv_error(&mut self) -> Option<SessionError> {
        self.error_rx.recv().await
    }
}

/// Owns a session until `start` hands it to the runtime
pub struct Orchestrator {
    config: SessionConfig,
    collaborators: Collaborators,
    state: SharedSessionState,
    command_rx: mpsc::Receiver<SessionCommand>,
    // Weak so the loop still notices when every handle is dropped
    speech_tx: mpsc::WeakSender<SessionCommand>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    error_tx: mpsc::UnboundedSender<SessionError>,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        config: SessionConfig,
        collaborators: Collaborators,
    ) -> Result<(Self, OrchestratorHandle)> {
        config.validate()?;

        let (command_tx, command_rx) = mpsc::channel(config.channel_buffer_size);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        let state = SharedSessionState::new(SessionState::new(config.mode));

        let speech_tx = command_tx.downgrade();
        let handle = OrchestratorHandle {
            command_tx,
            event_rx,
            error_rx,
            state: state.clone(),
        };

        let orchestrator = Self {
            config,
            collaborators,
            state,
            command_rx,
            speech_tx,
            event_tx,
            error_tx,
        };

        Ok((orchestrator, handle))
    }

    /// Seed the greeting and spawn the event loop on the current runtime
    pub fn start(self) -> Result<JoinHandle<()>> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            EchoesError::Config(format!("Orchestrator needs a tokio runtime: {}", e))
        })?;

        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let mut session = SessionLoop {
            config: self.config,
            collaborators: self.collaborators,
            state: self.state,
            speech_tx: self.speech_tx,
            event_tx: self.event_tx,
            error_tx: self.error_tx,
            progress_tx,
            capture: SpeechCapture::new(),
            turn: None,
            started: Instant::now(),
        };
        session.open();

        Ok(runtime.spawn(session.run(self.command_rx, progress_rx)))
    }
}

/// Reports from a turn task back to the loop
#[derive(Debug)]
enum TurnProgress {
    Replied(Result<GeneratedReply>),
    Reflected(Result<GeneratedReflection>),
    Finished,
}

struct ActiveTurn {
    reflection_due: bool,
    task: JoinHandle<()>,
}

struct SessionLoop {
    config: SessionConfig,
    collaborators: Collaborators,
    state: SharedSessionState,
    speech_tx: mpsc::WeakSender<SessionCommand>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    error_tx: mpsc::UnboundedSender<SessionError>,
    progress_tx: mpsc::UnboundedSender<TurnProgress>,
    capture: SpeechCapture,
    turn: Option<ActiveTurn>,
    started: Instant,
}

impl SessionLoop {
    fn open(&mut self) {
        let details = self.config.mode.details();
        let greeting = self
            .state
            .update(|s| s.transcript.push_ai(details.greeting, Mood::Calm).clone());
        info!("Session opened in {}", details.name);

        self.emit(SessionEvent::MessageAppended(greeting));
        self.speak(details.greeting);
    }

    async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<SessionCommand>,
        mut progress_rx: mpsc::UnboundedReceiver<TurnProgress>,
    ) {
        loop {
            tokio::select! {
                command = command_rx.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command) {
                            break;
                        }
                    }
                    None => {
                        warn!("All session handles dropped, ending session");
                        self.end();
                        break;
                    }
                },
                Some(progress) = progress_rx.recv() => self.handle_progress(progress),
            }
        }

        info!("Session loop stopped");
    }

    /// Returns false once the session has ended
    fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Submit(text) => self.submit(text),
            SessionCommand::SubmitInput => {
                let text = self.state.input();
                self.submit(text);
            }
            SessionCommand::SetInput(text) => {
                self.state.update(|s| s.input = text.clone());
                self.emit(SessionEvent::InputChanged(text));
            }
            SessionCommand::ToggleCapture => self.toggle_capture(),
            SessionCommand::Speech(event) => self.on_speech_event(event),
            SessionCommand::DismissReflection => self.dismiss_reflection(),
            SessionCommand::End(reply) => {
                let summary = self.end();
                let _ = reply.send(summary);
                return false;
            }
        }
        true
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine; the state snapshot is still current
        let _ = self.event_tx.send(event);
    }

    fn speak(&self, text: &str) {
        if let Some(output) = &self.collaborators.speech_output {
            dispatch_utterance(output.as_ref(), text);
        }
    }

    fn submit(&mut self, text: String) {
        if text.trim().is_empty() {
            debug!("Ignoring empty submission");
            return;
        }
        if self.turn.is_some() {
            debug!("Reply still composing, submission ignored");
            self.emit(SessionEvent::SubmissionRejected(RejectReason::Composing));
            return;
        }

        if self.capture.is_capturing() {
            self.stop_capture();
        }

        let window = self.config.history_window;
        let (message, words, user_turns, history) = self.state.update(|s| {
            let message = s.transcript.push_user(text.as_str()).clone();
            let words = message.word_count();
            s.user_word_count += words;
            s.input.clear();
            s.composing = true;
            (message, words, s.user_turns(), s.transcript.recent_history(window))
        });
        info!("User turn {} ({} words)", user_turns, words);

        self.emit(SessionEvent::MessageAppended(message));
        self.emit(SessionEvent::InputChanged(String::new()));
        self.emit(SessionEvent::ComposingChanged(true));

        let reflection_due = self.config.reflection_due(user_turns);
        let request = ResponseRequest {
            user_input: text,
            mode: self.config.mode,
            history,
        };
        let task = tokio::spawn(run_turn(
            Arc::clone(&self.collaborators.responder),
            Arc::clone(&self.collaborators.reflector),
            request,
            reflection_due,
            self.progress_tx.clone(),
        ));

        self.turn = Some(ActiveTurn {
            reflection_due,
            task,
        });
    }

    fn handle_progress(&mut self, progress: TurnProgress) {
        match progress {
            TurnProgress::Replied(Ok(reply)) => {
                let message = self.state.update(|s| {
                    s.transcript
                        .push_ai(reply.response.as_str(), reply.mood)
                        .clone()
                });
                debug!("AI replied ({})", reply.mood);
                self.emit(SessionEvent::MessageAppended(message));
                self.speak(&reply.response);

                let reflection_due = self.turn.as_ref().is_some_and(|t| t.reflection_due);
                if !reflection_due {
                    self.dismiss_reflection();
                }
            }

            TurnProgress::Replied(Err(e)) => {
                warn!("Response generator failed: {}", e);
                let message = self
                    .state
                    .update(|s| s.transcript.push_ai(FALLBACK_REPLY, Mood::Calm).clone());
                self.emit(SessionEvent::MessageAppended(message));
                self.emit(SessionEvent::GeneratorFailed(e.to_string()));
            }

            TurnProgress::Reflected(Ok(generated)) => {
                info!("Reflection prompt ready");
                let text = generated.reflection;
                self.state.update(|s| s.reflection = Some(text.clone()));
                self.emit(SessionEvent::ReflectionShown(text));
            }

            TurnProgress::Reflected(Err(e)) => {
                warn!("Reflection generator failed: {}", e);
                self.dismiss_reflection();
                self.emit(SessionEvent::ReflectionFailed(e.to_string()));
            }

            TurnProgress::Finished => {
                self.turn = None;
                let user_turns = self.state.update(|s| {
                    s.composing = false;
                    s.user_turns()
                });
                self.emit(SessionEvent::ComposingChanged(false));
                self.emit(SessionEvent::TurnCompleted { user_turns });
            }
        }
    }

    fn dismiss_reflection(&mut self) {
        let was_shown = self.state.update(|s| s.reflection.take().is_some());
        if was_shown {
            self.emit(SessionEvent::ReflectionDismissed);
        }
    }

    fn set_capture_state(&mut self, capture: CaptureState) {
        let changed = self.state.update(|s| {
            let changed = s.capture != capture;
            s.capture = capture;
            changed
        });
        if changed {
            self.emit(SessionEvent::CaptureChanged(capture));
        }
    }

    fn toggle_capture(&mut self) {
        if self.capture.is_capturing() {
            self.stop_capture();
            return;
        }

        let events = match (self.speech_tx.upgrade(), &self.collaborators.recognizer) {
            (Some(command_tx), Some(_)) => SpeechEventSender { command_tx },
            _ => {
                warn!("Speech capture requested but no recognizer is configured");
                self.emit(SessionEvent::Notice(CAPTURE_UNAVAILABLE.to_string()));
                return;
            }
        };

        let locale = self.config.capture.locale.clone();
        let started = match self.collaborators.recognizer.as_mut() {
            Some(recognizer) => recognizer.start(&locale, events),
            None => return,
        };

        match started {
            Ok(()) => {
                info!("Speech capture started ({})", locale);
                self.capture.begin();
                self.set_capture_state(CaptureState::Capturing);
            }
            Err(e) => {
                warn!("Speech recognizer refused to start: {}", e);
                self.emit(SessionEvent::Notice(e.user_message()));
            }
        }
    }

    fn stop_capture(&mut self) {
        if let Some(recognizer) = self.collaborators.recognizer.as_mut() {
            recognizer.stop();
        }
        if self.capture.finish() {
            debug!("Speech capture stopped");
            self.set_capture_state(CaptureState::Idle);
        }
    }

    fn on_speech_event(&mut self, event: SpeechInputEvent) {
        match self.capture.on_event(event) {
            CaptureOutcome::Unchanged => {}
            CaptureOutcome::BufferUpdated(text) => {
                self.state.update(|s| s.input = text.clone());
                self.emit(SessionEvent::InputChanged(text));
            }
            CaptureOutcome::Stopped => {
                debug!("Speech capture ended");
                self.set_capture_state(CaptureState::Idle);
            }
            CaptureOutcome::Failed(message) => {
                warn!("{}", message);
                self.set_capture_state(CaptureState::Idle);
                self.emit(SessionEvent::Notice(message));
            }
        }
    }

    fn end(&mut self) -> SessionSummary {
        if let Some(output) = &self.collaborators.speech_output {
            output.cancel_all();
        }

        if self.capture.is_capturing() {
            if let Some(recognizer) = self.collaborators.recognizer.as_mut() {
                recognizer.abort();
            }
            self.capture.finish();
            self.set_capture_state(CaptureState::Idle);
        }

        if let Some(turn) = self.turn.take() {
            debug!("Abandoning in-flight turn");
            turn.task.abort();
        }

        let policy = self.config.word_case;
        let (session_id, user_turns, user_word_count, unique_words, was_composing) =
            self.state.update(|s| {
                let was_composing = s.composing;
                s.composing = false;
                s.ended = true;
                (
                    s.session_id,
                    s.user_turns(),
                    s.user_word_count,
                    stats::unique_word_count(s.transcript.user_messages(), policy),
                    was_composing,
                )
            });
        if was_composing {
            self.emit(SessionEvent::ComposingChanged(false));
        }

        let mut summary = SessionSummary {
            session_id,
            mode: self.config.mode,
            user_turns,
            elapsed_minutes: stats::whole_minutes(self.started.elapsed()),
            user_word_count,
            unique_words,
            stats_write: StatsWrite::Skipped(SkipReason::NoUserTurns),
        };
        summary.stats_write = self.persist_stats(&summary);

        info!(
            "Session ended: {} turns, {} minutes, {} unique words",
            summary.user_turns, summary.elapsed_minutes, summary.unique_words
        );
        self.emit(SessionEvent::SessionEnded(summary.clone()));
        summary
    }

    /// Fire-and-forget write of the session statistics
    fn persist_stats(&self, summary: &SessionSummary) -> StatsWrite {
        if summary.user_turns == 0 {
            return StatsWrite::Skipped(SkipReason::NoUserTurns);
        }
        let Some(user) = self.config.user_id.clone() else {
            debug!("Anonymous session, stats not saved");
            return StatsWrite::Skipped(SkipReason::NoUserIdentity);
        };
        let Some(store) = self.collaborators.stats_store.clone() else {
            debug!("No stats store configured");
            return StatsWrite::Skipped(SkipReason::NoStore);
        };

        let update = summary.stats_update(Utc::now().date_naive());
        let error_tx = self.error_tx.clone();
        let session_id = summary.session_id;

        tokio::spawn(async move {
            match store.apply(&user, update).await {
                Ok(()) => info!("Session stats saved for {}", user),
                Err(e) => {
                    error!("Failed to save session stats for {}: {}", user, e);
                    let _ = error_tx.send(SessionError {
                        session_id,
                        error: e,
                    });
                }
            }
        });

        StatsWrite::Dispatched
    }
}

/// One turn cycle: reply, then an optional reflection
async fn run_turn(
    responder: Arc<dyn ResponseGenerator>,
    reflector: Arc<dyn ReflectionGenerator>,
    request: ResponseRequest,
    reflection_due: bool,
    progress_tx: mpsc::UnboundedSender<TurnProgress>,
) {
    let mut history = request.history.clone();

    let reply = AssertUnwindSafe(responder.generate_response(request))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(EchoesError::Generator("Response generator panicked".into())));
    let reply_text = reply.as_ref().ok().map(|r| r.response.clone());
    let _ = progress_tx.send(TurnProgress::Replied(reply));

    if let (true, Some(text)) = (reflection_due, reply_text) {
        history.push(HistoryEntry::new(Speaker::Ai, text));
        let reflection = AssertUnwindSafe(reflector.generate_reflection(ReflectionRequest { history }))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(EchoesError::Reflection("Reflection generator panicked".into()))
            });
        let _ = progress_tx.send(TurnProgress::Reflected(reflection));
    }

    let _ = progress_tx.send(TurnProgress::Finished);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl ResponseGenerator for Echo {
        async fn generate_response(&self, request: ResponseRequest) -> Result<GeneratedReply> {
            Ok(GeneratedReply {
                response: format!("You said: {}", request.user_input),
                mood: Mood::Curious,
            })
        }
    }

    #[async_trait]
    impl ReflectionGenerator for Echo {
        async fn generate_reflection(
            &self,
            request: ReflectionRequest,
        ) -> Result<GeneratedReflection> {
            Ok(GeneratedReflection {
                reflection: format!("{} messages so far", request.history.len()),
            })
        }
    }

    struct Panicking;

    #[async_trait]
    impl ResponseGenerator for Panicking {
        async fn generate_response(&self, _request: ResponseRequest) -> Result<GeneratedReply> {
            panic!("model exploded");
        }
    }

    #[test]
    fn test_final_segments_wait_for_room() {
        let (command_tx, mut command_rx) = mpsc::channel(1);
        let sender = SpeechEventSender { command_tx };

        sender.send(SpeechInputEvent::Started).unwrap();
        // Channel is full: a partial hypothesis is dropped
        assert!(sender.send(SpeechInputEvent::interims(&[" hel"])).is_err());

        let recognizer = std::thread::spawn(move || {
            sender.send(SpeechInputEvent::finals(&[" hello"]))
        });

        assert!(matches!(
            command_rx.blocking_recv(),
            Some(SessionCommand::Speech(SpeechInputEvent::Started))
        ));
        assert!(recognizer.join().unwrap().is_ok());
        match command_rx.blocking_recv() {
            Some(SessionCommand::Speech(event)) => {
                assert_eq!(event, SpeechInputEvent::finals(&[" hello"]))
            }
            _ => panic!("final segment was lost"),
        }
    }

    fn request(history: usize) -> ResponseRequest {
        ResponseRequest {
            user_input: "hi".into(),
            mode: Default::default(),
            history: (0..history)
                .map(|i| HistoryEntry::new(Speaker::User, format!("m{}", i)))
                .collect(),
        }
    }

    async fn collect(mut rx: mpsc::UnboundedReceiver<TurnProgress>) -> Vec<TurnProgress> {
        let mut out = Vec::new();
        while let Some(progress) = rx.recv().await {
            out.push(progress);
        }
        out
    }

    #[tokio::test]
    async fn test_turn_without_reflection() {
        let (tx, rx) = mpsc::unbounded_channel();
        run_turn(Arc::new(Echo), Arc::new(Echo), request(1), false, tx).await;

        let progress = collect(rx).await;
        assert_eq!(progress.len(), 2);
        assert!(matches!(&progress[0], TurnProgress::Replied(Ok(r)) if r.response == "You said: hi"));
        assert!(matches!(progress[1], TurnProgress::Finished));
    }

    #[tokio::test]
    async fn test_reflection_sees_window_plus_reply() {
        let (tx, rx) = mpsc::unbounded_channel();
        run_turn(Arc::new(Echo), Arc::new(Echo), request(10), true, tx).await;

        let progress = collect(rx).await;
        assert_eq!(progress.len(), 3);
        assert!(
            matches!(&progress[1], TurnProgress::Reflected(Ok(r)) if r.reflection == "11 messages so far")
        );
    }

    #[tokio::test]
    async fn test_panicking_generator_becomes_failure() {
        let (tx, rx) = mpsc::unbounded_channel();
        run_turn(Arc::new(Panicking), Arc::new(Echo), request(1), true, tx).await;

        let progress = collect(rx).await;
        assert_eq!(progress.len(), 2);
        assert!(matches!(
            &progress[0],
            TurnProgress::Replied(Err(EchoesError::Generator(_)))
        ));
        assert!(matches!(progress[1], TurnProgress::Finished));
    }

    #[tokio::test]
    async fn test_start_seeds_greeting() {
        let collaborators = Collaborators::new(Arc::new(Echo), Arc::new(Echo));
        let config = SessionConfig::new(crate::conversation::InteractionMode::NonAgentic);
        let (orchestrator, mut handle) = Orchestrator::new(config, collaborators).unwrap();
        orchestrator.start().unwrap();

        let messages = handle.state().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].text,
            "Hello! You've selected Non-Agentic AI Mode. Ask me anything."
        );
        assert_eq!(messages[0].mood, Some(Mood::Calm));
        assert!(matches!(
            handle.try_recv_event(),
            Some(SessionEvent::MessageAppended(_))
        ));
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let collaborators = Collaborators::new(Arc::new(Echo), Arc::new(Echo));
        let (orchestrator, _handle) =
            Orchestrator::new(SessionConfig::default(), collaborators).unwrap();
        assert!(matches!(orchestrator.start(), Err(EchoesError::Config(_))));
    }
}
