//! Contracts for the hosted response and reflection generators
//!
//! The orchestrator only depends on these traits. Requests carry copies of
//! transcript data, so a generator can never reach back into session state.

use crate::conversation::InteractionMode;
use crate::messages::{HistoryEntry, Mood};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRequest {
    /// The learner's current message
    pub user_input: String,
    pub mode: InteractionMode,
    /// Bounded trailing window of the transcript
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedReply {
    pub response: String,
    pub mood: Mood,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionRequest {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedReflection {
    pub reflection: String,
}

/// Produces the conversation partner's next reply
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate_response(&self, request: ResponseRequest) -> Result<GeneratedReply>;
}

/// Produces a single reflective question about the conversation so far
#[async_trait]
pub trait ReflectionGenerator: Send + Sync {
    async fn generate_reflection(&self, request: ReflectionRequest)
        -> Result<GeneratedReflection>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Speaker;

    #[test]
    fn test_response_request_wire_format() {
        let request = ResponseRequest {
            user_input: "I like cats".to_string(),
            mode: InteractionMode::NonAgentic,
            history: vec![HistoryEntry::new(Speaker::User, "I like cats")],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userInput"], "I like cats");
        assert_eq!(json["mode"], "non-agentic");
        assert_eq!(json["history"][0]["speaker"], "user");
    }

    #[test]
    fn test_reply_parses_from_model_output() {
        let reply: GeneratedReply =
            serde_json::from_str(r#"{"response":"Why cats?","mood":"curious"}"#).unwrap();
        assert_eq!(reply.mood, Mood::Curious);

        let bad = serde_json::from_str::<GeneratedReply>(r#"{"response":"x","mood":"angry"}"#);
        assert!(bad.is_err());
    }
}
