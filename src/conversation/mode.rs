//! Interaction modes and their fixed presentation details

use crate::{EchoesError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conversational stance chosen once per session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionMode {
    /// Empathic and adaptive, helps the learner explore their story
    #[default]
    Agentic,
    /// Straightforward question-and-answer
    NonAgentic,
    /// A fellow learner (stand-in, not fully developed)
    Peer,
}

/// Display metadata for a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDetails {
    pub name: &'static str,
    pub greeting: &'static str,
    pub tone: &'static str,
}

impl InteractionMode {
    pub const ALL: [InteractionMode; 3] = [
        InteractionMode::Agentic,
        InteractionMode::NonAgentic,
        InteractionMode::Peer,
    ];

    /// Route-string form (`agentic`, `non-agentic`, `peer`)
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionMode::Agentic => "agentic",
            InteractionMode::NonAgentic => "non-agentic",
            InteractionMode::Peer => "peer",
        }
    }

    pub fn details(&self) -> ModeDetails {
        match self {
            InteractionMode::Agentic => ModeDetails {
                name: "Agentic AI Mode",
                greeting: "Hello! I see you've chosen Agentic AI Mode. I'm ready to listen. What's on your mind today?",
                tone: "Be empathic, adaptive, and reflective. Help the user explore their story in depth.",
            },
            InteractionMode::NonAgentic => ModeDetails {
                name: "Non-Agentic AI Mode",
                greeting: "Hello! You've selected Non-Agentic AI Mode. Ask me anything.",
                tone: "Be straightforward and reactive. For simple question-and-answer.",
            },
            InteractionMode::Peer => ModeDetails {
                name: "Peer Mode",
                greeting: "Hey! I'm in Peer Mode. Ready to practice our conversation skills together? What should we talk about?",
                tone: "Be like a fellow learner. (This mode is not fully implemented).",
            },
        }
    }

    /// Resolve the mode from an optional route parameter, defaulting to agentic
    pub fn from_route(param: Option<&str>) -> Result<Self> {
        match param {
            None => Ok(Self::default()),
            Some(value) => value.parse(),
        }
    }
}

impl FromStr for InteractionMode {
    type Err = EchoesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "agentic" => Ok(InteractionMode::Agentic),
            "non-agentic" => Ok(InteractionMode::NonAgentic),
            "peer" => Ok(InteractionMode::Peer),
            other => Err(EchoesError::Config(format!(
                "unknown interaction mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_strings_round_trip() {
        for mode in InteractionMode::ALL {
            assert_eq!(mode.as_str().parse::<InteractionMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_serde_uses_route_strings() {
        let json = serde_json::to_string(&InteractionMode::NonAgentic).unwrap();
        assert_eq!(json, "\"non-agentic\"");
    }

    #[test]
    fn test_missing_route_defaults_to_agentic() {
        assert_eq!(
            InteractionMode::from_route(None).unwrap(),
            InteractionMode::Agentic
        );
        assert!(InteractionMode::from_route(Some("mentor")).is_err());
    }

    #[test]
    fn test_every_mode_has_a_greeting() {
        for mode in InteractionMode::ALL {
            let details = mode.details();
            assert!(!details.name.is_empty());
            assert!(!details.greeting.is_empty());
        }
        assert!(InteractionMode::Peer.details().greeting.contains("Peer Mode"));
    }
}
