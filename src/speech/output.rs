//! Speech output
//!
//! Utterances are fire-and-forget: the orchestrator never waits for playback.
//! `CommandSpeaker` drives a system text-to-speech program from a worker
//! thread and kills the running child whenever it is interrupted.

use crate::{EchoesError, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// A sink that can speak text aloud
pub trait SpeechOutput: Send + Sync {
    /// Queue `text` for playback
    fn speak(&self, text: &str);

    /// Stop the current utterance and drop anything queued
    fn cancel_all(&self);
}

/// Speak `text`, interrupting whatever is playing
///
/// At most one utterance is ever audible: a new one always replaces the old.
pub fn dispatch_utterance(output: &dyn SpeechOutput, text: &str) {
    output.cancel_all();
    output.speak(text);
}

/// Configuration for the system TTS program
#[derive(Clone, Debug)]
pub struct SpeakerConfig {
    /// Program to run, e.g. `espeak-ng` or `say`
    pub program: String,

    /// Arguments placed before the text
    pub args: Vec<String>,

    /// Maximum number of pending commands
    pub queue_size: usize,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            program: default_program().to_string(),
            args: Vec::new(),
            queue_size: 16,
        }
    }
}

impl SpeakerConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_queue_size(mut self, size: usize) -> Self {
        self.queue_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(EchoesError::Config("Speaker program cannot be empty".into()));
        }
        if self.queue_size == 0 {
            return Err(EchoesError::Config("Speaker queue size must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn default_program() -> &'static str {
    "say"
}

#[cfg(not(target_os = "macos"))]
fn default_program() -> &'static str {
    "espeak-ng"
}

/// Commands for the speaker worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerCommand {
    Speak(String),
    CancelAll,
    Shutdown,
}

/// `SpeechOutput` backed by a system TTS program
pub struct CommandSpeaker {
    command_tx: Sender<SpeakerCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl CommandSpeaker {
    /// Validate `config` and start the worker thread
    pub fn start(config: SpeakerConfig) -> Result<Self> {
        config.validate()?;
        let (command_tx, command_rx) = bounded(config.queue_size);

        let worker = thread::Builder::new()
            .name("echoes-speaker".into())
            .spawn(move || run_worker(config, command_rx))
            .map_err(|e| EchoesError::Speech(format!("Failed to start speaker thread: {}", e)))?;

        Ok(Self {
            command_tx,
            worker: Some(worker),
        })
    }

    fn send(&self, command: SpeakerCommand) {
        match self.command_tx.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                warn!("Speaker queue full, dropping {:?}", command);
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Speaker worker is gone");
            }
        }
    }
}

impl SpeechOutput for CommandSpeaker {
    fn speak(&self, text: &str) {
        let text = normalize_for_speech(text);
        if text.is_empty() {
            return;
        }
        self.send(SpeakerCommand::Speak(text));
    }

    fn cancel_all(&self) {
        self.send(SpeakerCommand::CancelAll);
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        let _ = self.command_tx.send(SpeakerCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Speaker worker panicked");
            }
        }
    }
}

const REAP_INTERVAL: Duration = Duration::from_millis(50);
const PREVIEW_CHARS: usize = 50;

/// At most `max_chars` characters of `text`, cut on a char boundary
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn run_worker(config: SpeakerConfig, command_rx: Receiver<SpeakerCommand>) {
    info!("Speaker worker starting ({})", config.program);
    let mut current: Option<Child> = None;

    loop {
        match command_rx.recv_timeout(REAP_INTERVAL) {
            Ok(SpeakerCommand::Speak(text)) => {
                stop_child(&mut current);
                debug!("Speaking: {}", preview(&text, PREVIEW_CHARS));

                match Command::new(&config.program)
                    .args(&config.args)
                    .arg(&text)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                {
                    Ok(child) => current = Some(child),
                    Err(e) => warn!("Failed to run {}: {}", config.program, e),
                }
            }

            Ok(SpeakerCommand::CancelAll) => stop_child(&mut current),

            Ok(SpeakerCommand::Shutdown) => {
                info!("Speaker worker shutting down");
                stop_child(&mut current);
                break;
            }

            Err(RecvTimeoutError::Timeout) => reap_child(&mut current),

            Err(RecvTimeoutError::Disconnected) => {
                stop_child(&mut current);
                break;
            }
        }
    }

    info!("Speaker worker stopped");
}

fn stop_child(current: &mut Option<Child>) {
    if let Some(mut child) = current.take() {
        if let Ok(None) = child.try_wait() {
            debug!("Interrupting utterance");
            let _ = child.kill();
        }
        let _ = child.wait();
    }
}

fn reap_child(current: &mut Option<Child>) {
    let finished = match current.as_mut().map(|child| child.try_wait()) {
        Some(Ok(Some(_))) | Some(Err(_)) => true,
        _ => false,
    };
    if finished {
        *current = None;
    }
}

/// Strip markup a TTS program would read out literally
pub fn normalize_for_speech(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '#' | '`'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<String>>,
    }

    impl SpeechOutput for Recording {
        fn speak(&self, text: &str) {
            self.calls.lock().push(format!("speak:{}", text));
        }

        fn cancel_all(&self) {
            self.calls.lock().push("cancel".into());
        }
    }

    #[test]
    fn test_dispatch_cancels_before_speaking() {
        let sink = Recording::default();
        dispatch_utterance(&sink, "hello");
        dispatch_utterance(&sink, "again");
        assert_eq!(
            *sink.calls.lock(),
            vec!["cancel", "speak:hello", "cancel", "speak:again"]
        );
    }

    #[test]
    fn test_normalize_for_speech() {
        assert_eq!(
            normalize_for_speech("**Great**  point,\n_really_ `good`"),
            "Great point, really good"
        );
        assert_eq!(normalize_for_speech("  ** "), "");
    }

    #[test]
    fn test_speaker_config_validation() {
        assert!(SpeakerConfig::default().validate().is_ok());
        assert!(SpeakerConfig::new("  ").validate().is_err());
        assert!(SpeakerConfig::new("say").with_queue_size(0).validate().is_err());
    }

    #[test]
    fn test_missing_program_does_not_panic() {
        let speaker =
            CommandSpeaker::start(SpeakerConfig::new("/nonexistent/echoes-tts")).unwrap();
        dispatch_utterance(&speaker, "nobody hears this");
        drop(speaker);
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        let text = format!("{}\u{2019}s fine", "a".repeat(49));
        assert_eq!(preview(&text, 50), format!("{}\u{2019}", "a".repeat(49)));
        assert_eq!(preview("short", 50), "short");
        assert_eq!(preview("", 50), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_worker_survives_multibyte_reply_with_debug_logging() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();

        let mut speaker = CommandSpeaker::start(SpeakerConfig::new("true")).unwrap();
        // The apostrophe spans bytes 49..52
        speaker.speak(&format!("{}\u{2019}s fine", "a".repeat(49)));
        speaker.speak("still talking");
        speaker.command_tx.send(SpeakerCommand::Shutdown).unwrap();

        let worker = speaker.worker.take().unwrap();
        assert!(worker.join().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_interrupts_long_utterance() {
        // `sleep 30` stands in for a long utterance; dropping must not wait for it
        let speaker = CommandSpeaker::start(SpeakerConfig::new("sleep")).unwrap();
        speaker.speak("30");
        speaker.cancel_all();

        let started = std::time::Instant::now();
        drop(speaker);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
