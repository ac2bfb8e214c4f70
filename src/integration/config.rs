//! Configuration for the integration layer
//!
//! Provides centralized configuration for all components.

use crate::conversation::{InteractionMode, SessionConfig, WordCasePolicy};
use crate::llm::GeminiConfig;
use crate::profile::UserId;
use crate::speech::{CaptureConfig, ListenerConfig, SpeakerConfig};
use crate::{EchoesError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_STATS_FILE: &str = "echoes-stats.json";

/// Configuration for a complete session
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Session configuration
    pub session: SessionConfig,

    /// Hosted model configuration
    pub gemini: GeminiConfig,

    /// System TTS configuration
    pub speaker: SpeakerConfig,

    /// External speech recognizer, if any
    pub listener: Option<ListenerConfig>,

    /// Whether AI replies are spoken aloud
    pub enable_speech_output: bool,

    /// JSON document holding every learner's statistics
    pub stats_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            gemini: GeminiConfig::default(),
            speaker: SpeakerConfig::default(),
            listener: None,
            enable_speech_output: false,
            stats_file: PathBuf::from(DEFAULT_STATS_FILE),
        }
    }
}

impl AppConfig {
    /// Read `GEMINI_API_KEY` and `ECHOES_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(key) = get("GEMINI_API_KEY") {
            config.gemini.api_key = key;
        }
        if let Some(model) = get("ECHOES_GEMINI_MODEL") {
            config.gemini = config.gemini.with_model(model);
        }
        if let Some(url) = get("ECHOES_GEMINI_BASE_URL") {
            config.gemini = config.gemini.with_base_url(url);
        }
        if let Some(temperature) = get("ECHOES_TEMPERATURE") {
            config.gemini.temperature = parse_var("ECHOES_TEMPERATURE", &temperature)?;
        }
        if let Some(secs) = get("ECHOES_GEMINI_TIMEOUT_SECS") {
            let secs: u64 = parse_var("ECHOES_GEMINI_TIMEOUT_SECS", &secs)?;
            config.gemini = config.gemini.with_timeout(Duration::from_secs(secs));
        }

        config.session.mode = InteractionMode::from_route(get("ECHOES_MODE").as_deref())?;
        if let Some(user) = get("ECHOES_USER_ID") {
            config.session.user_id = Some(UserId::new(user.trim()));
        }
        if let Some(window) = get("ECHOES_HISTORY_WINDOW") {
            config.session.history_window = parse_var("ECHOES_HISTORY_WINDOW", &window)?;
        }
        if let Some(interval) = get("ECHOES_REFLECTION_INTERVAL") {
            config.session.reflection_interval =
                parse_var("ECHOES_REFLECTION_INTERVAL", &interval)?;
        }
        if let Some(flag) = get("ECHOES_CASE_INSENSITIVE") {
            if parse_flag("ECHOES_CASE_INSENSITIVE", &flag)? {
                config.session.word_case = WordCasePolicy::Insensitive;
            }
        }
        if let Some(locale) = get("ECHOES_LOCALE") {
            config.session.capture = CaptureConfig::new(locale.trim());
        }

        if let Some(flag) = get("ECHOES_SPEAK") {
            config.enable_speech_output = parse_flag("ECHOES_SPEAK", &flag)?;
        }
        if let Some(program) = get("ECHOES_TTS_PROGRAM") {
            config.speaker.program = program.trim().to_string();
        }
        if let Some(args) = get("ECHOES_TTS_ARGS") {
            config.speaker.args = split_args(&args);
        }
        if let Some(program) = get("ECHOES_STT_PROGRAM") {
            let args = get("ECHOES_STT_ARGS").map(|a| split_args(&a)).unwrap_or_default();
            config.listener = Some(ListenerConfig::new(program.trim()).with_args(args));
        }
        if let Some(path) = get("ECHOES_STATS_FILE") {
            config.stats_file = PathBuf::from(path.trim());
        }

        Ok(config)
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn with_gemini(mut self, gemini: GeminiConfig) -> Self {
        self.gemini = gemini;
        self
    }

    pub fn with_speech_output(mut self, speaker: SpeakerConfig) -> Self {
        self.speaker = speaker;
        self.enable_speech_output = true;
        self
    }

    pub fn with_listener(mut self, listener: ListenerConfig) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn with_stats_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stats_file = path.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        self.gemini.validate()?;
        if self.enable_speech_output {
            self.speaker.validate()?;
        }
        if let Some(listener) = &self.listener {
            listener.validate()?;
        }
        if self.stats_file.as_os_str().is_empty() {
            return Err(EchoesError::Config("Stats file path cannot be empty".into()));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| EchoesError::Config(format!("{} has an invalid value: {}", key, value)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(EchoesError::Config(format!(
            "{} must be a boolean, got {}",
            key, value
        ))),
    }
}

fn split_args(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}
