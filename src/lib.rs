//! Evolving Echoes - guided conversational practice for English learners
//!
//! The crate hosts the conversation orchestrator (turn-taking, periodic
//! reflection, speech capture and playback wiring, session statistics) and
//! the collaborators it talks to: hosted prompt flows, speech engines and the
//! profile statistics store.

pub mod conversation;
pub mod integration;
pub mod llm;
pub mod messages;
pub mod profile;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum EchoesError {
    #[error("Generator error: {0}")]
    Generator(String),

    #[error("Reflection error: {0}")]
    Reflection(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Stats store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("IO error: {0}")]
    IO(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for EchoesError {
    fn from(e: std::io::Error) -> Self {
        EchoesError::IO(e.to_string())
    }
}

impl From<serde_json::Error> for EchoesError {
    fn from(e: serde_json::Error) -> Self {
        EchoesError::Serialization(e.to_string())
    }
}

impl EchoesError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hosted model hiccups clear up on the next turn
            EchoesError::Generator(_) => true,
            EchoesError::Reflection(_) => true,
            // Permission problems need the user to act
            EchoesError::Speech(_) => false,
            EchoesError::Store(_) => true,
            EchoesError::Config(_) => false,
            EchoesError::Channel(_) => false,
            EchoesError::IO(_) => false,
            EchoesError::Serialization(_) => true,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            EchoesError::Generator(_) => {
                "The conversation partner could not be reached. Please try again.".to_string()
            }
            EchoesError::Reflection(_) => {
                "No reflection prompt is available right now.".to_string()
            }
            EchoesError::Speech(_) => {
                "Speech recognition failed. Please ensure you've granted microphone permissions."
                    .to_string()
            }
            EchoesError::Store(_) => "Your progress could not be saved.".to_string(),
            EchoesError::Config(_) => "Configuration error. Please check settings.".to_string(),
            EchoesError::Channel(_) => {
                "Internal communication error. Please restart the session.".to_string()
            }
            EchoesError::IO(_) => "File system error occurred.".to_string(),
            EchoesError::Serialization(_) => {
                "Received a response in an unexpected format.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EchoesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let err: EchoesError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, EchoesError::IO(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: EchoesError = parse.unwrap_err().into();
        assert!(matches!(err, EchoesError::Serialization(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_user_messages_hide_details() {
        let err = EchoesError::Generator("HTTP 503 upstream".into());
        assert!(!err.user_message().contains("503"));
        assert!(err.to_string().contains("503"));
    }
}
