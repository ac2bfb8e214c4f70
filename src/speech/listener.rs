//! Speech recognition through an external program
//!
//! The program is started on every capture and must print recognised text
//! to stdout, one segment per line. A line starting with `~` is an interim
//! hypothesis that replaces the previous one; any other line is final.
//! The configured locale is passed in the `ECHOES_LOCALE` environment variable.

use super::capture::{SpeechErrorKind, SpeechInputEvent, SpeechRecognizer};
use crate::conversation::SpeechEventSender;
use crate::{EchoesError, Result};
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct ListenerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl ListenerConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(EchoesError::Config("Listener program cannot be empty".into()));
        }
        Ok(())
    }
}

/// One line of listener output
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Final(String),
    Interim(String),
}

fn parse_line(line: &str) -> Option<Segment> {
    let line = line.trim_end();
    if let Some(interim) = line.strip_prefix('~') {
        return Some(Segment::Interim(format!(" {}", interim.trim())));
    }
    let text = line.trim();
    if text.is_empty() {
        None
    } else {
        Some(Segment::Final(format!(" {}", text)))
    }
}

pub struct CommandRecognizer {
    config: ListenerConfig,
    child: Option<Child>,
    discard: Arc<AtomicBool>,
}

impl CommandRecognizer {
    pub fn new(config: ListenerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            child: None,
            discard: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Kill the running program; its reader thread goes quiet first so a
    /// late `End` cannot stop the next capture
    fn kill(&mut self) {
        self.discard.store(true, Ordering::SeqCst);
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn start(&mut self, locale: &str, events: SpeechEventSender) -> Result<()> {
        self.kill();

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .env("ECHOES_LOCALE", locale)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                EchoesError::Speech(format!("Failed to run {}: {}", self.config.program, e))
            })?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            return Err(EchoesError::Speech("Listener stdout unavailable".into()));
        };

        let discard = Arc::new(AtomicBool::new(false));
        self.discard = Arc::clone(&discard);

        thread::Builder::new()
            .name("echoes-listener".into())
            .spawn(move || read_segments(stdout, events, discard))
            .map_err(|e| EchoesError::Speech(format!("Failed to start listener thread: {}", e)))?;

        info!("Listening with {}", self.config.program);
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        self.kill();
    }

    fn abort(&mut self) {
        self.kill();
    }
}

impl Drop for CommandRecognizer {
    fn drop(&mut self) {
        self.kill();
    }
}

fn read_segments(stdout: ChildStdout, events: SpeechEventSender, discard: Arc<AtomicBool>) {
    let _ = events.send(SpeechInputEvent::Started);

    for line in BufReader::new(stdout).lines() {
        if discard.load(Ordering::SeqCst) {
            return;
        }
        let event = match line {
            Ok(line) => match parse_line(&line) {
                Some(Segment::Final(text)) => SpeechInputEvent::Result {
                    finals: vec![text],
                    interims: Vec::new(),
                },
                Some(Segment::Interim(text)) => SpeechInputEvent::Result {
                    finals: Vec::new(),
                    interims: vec![text],
                },
                None => continue,
            },
            Err(e) => {
                warn!("Listener output unreadable: {}", e);
                SpeechInputEvent::Error(SpeechErrorKind::AudioCapture)
            }
        };
        let droppable = event.is_interim_only();
        if let Err(e) = events.send(event) {
            if !droppable {
                debug!("Session gone, listener reader stopping: {}", e);
                return;
            }
            debug!("Dropping interim listener output: {}", e);
        }
    }

    if !discard.load(Ordering::SeqCst) {
        let _ = events.send(SpeechInputEvent::End);
    }
}
