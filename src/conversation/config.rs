//! Per-session configuration

use super::mode::InteractionMode;
use super::stats::WordCasePolicy;
use crate::profile::UserId;
use crate::speech::CaptureConfig;
use crate::{EchoesError, Result};

/// Configuration for one conversation session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Conversational stance, fixed for the session
    pub mode: InteractionMode,

    /// Learner whose statistics are updated at session end
    pub user_id: Option<UserId>,

    /// Number of trailing transcript messages sent to the generators
    pub history_window: usize,

    /// A reflective question is requested every this many user turns
    pub reflection_interval: usize,

    /// How tokens are compared when counting unique words
    pub word_case: WordCasePolicy,

    /// Speech recognizer settings
    pub capture: CaptureConfig,

    /// Capacity of the command channel
    pub channel_buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: InteractionMode::default(),
            user_id: None,
            history_window: 10,
            reflection_interval: 5,
            word_case: WordCasePolicy::default(),
            capture: CaptureConfig::default(),
            channel_buffer_size: 100,
        }
    }
}

impl SessionConfig {
    pub fn new(mode: InteractionMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_history_window(mut self, messages: usize) -> Self {
        self.history_window = messages;
        self
    }

    pub fn with_reflection_interval(mut self, turns: usize) -> Self {
        self.reflection_interval = turns;
        self
    }

    pub fn with_word_case(mut self, policy: WordCasePolicy) -> Self {
        self.word_case = policy;
        self
    }

    pub fn with_capture(mut self, capture: CaptureConfig) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_channel_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }

    /// Whether the `user_turns`-th user turn should trigger a reflection
    pub fn reflection_due(&self, user_turns: usize) -> bool {
        user_turns > 0 && user_turns % self.reflection_interval == 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_window == 0 {
            return Err(EchoesError::Config("History window must be > 0".into()));
        }
        if self.reflection_interval == 0 {
            return Err(EchoesError::Config(
                "Reflection interval must be > 0".into(),
            ));
        }
        if self.channel_buffer_size == 0 {
            return Err(EchoesError::Config("Channel buffer size must be > 0".into()));
        }
        if let Some(user) = &self.user_id {
            if user.as_str().trim().is_empty() {
                return Err(EchoesError::Config("User id cannot be empty".into()));
            }
        }
        self.capture.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.mode, InteractionMode::Agentic);
        assert_eq!(config.history_window, 10);
        assert_eq!(config.reflection_interval, 5);
        assert_eq!(config.word_case, WordCasePolicy::Sensitive);
        assert!(config.user_id.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reflection_schedule() {
        let config = SessionConfig::default();
        let due: Vec<usize> = (0..=15).filter(|n| config.reflection_due(*n)).collect();
        assert_eq!(due, vec![5, 10, 15]);

        let every_other = SessionConfig::default().with_reflection_interval(2);
        assert!(every_other.reflection_due(2));
        assert!(!every_other.reflection_due(3));
    }

    #[test]
    fn test_validation() {
        assert!(SessionConfig::default()
            .with_reflection_interval(0)
            .validate()
            .is_err());
        assert!(SessionConfig::default()
            .with_history_window(0)
            .validate()
            .is_err());
        assert!(SessionConfig::default()
            .with_user(UserId::new(" "))
            .validate()
            .is_err());
        assert!(SessionConfig::new(InteractionMode::Peer)
            .with_user(UserId::new("learner-1"))
            .validate()
            .is_ok());
    }
}
