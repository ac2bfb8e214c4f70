use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Ai,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Ai => "ai",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone tag the model attaches to its replies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Calm,
    Curious,
    Supportive,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Calm => "calm",
            Mood::Curious => "curious",
            Mood::Supportive => "supportive",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rubric scores that can be attached to a learner's message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub clarity: Option<f32>,
    pub lexical_richness: Option<f32>,
    pub identity_depth: Option<f32>,
}

/// Session-local, creation-ordered message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub speaker: Speaker,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

impl Message {
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            speaker: Speaker::User,
            timestamp: Utc::now(),
            mood: None,
            feedback: None,
        }
    }

    pub fn ai(id: MessageId, text: impl Into<String>, mood: Mood) -> Self {
        Self {
            id,
            text: text.into(),
            speaker: Speaker::Ai,
            timestamp: Utc::now(),
            mood: Some(mood),
            feedback: None,
        }
    }

    /// Attach rubric feedback; only meaningful on learner messages
    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        if self.speaker == Speaker::User {
            self.feedback = Some(feedback);
        }
        self
    }

    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }

    /// Number of whitespace-delimited tokens in the text
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// The speaker+text projection sent to the prompt flows
    pub fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            speaker: self.speaker,
            text: self.text.clone(),
        }
    }
}

/// A message stripped down to what the hosted model sees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl HistoryEntry {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_message_carries_mood() {
        let msg = Message::ai(MessageId(1), "Hello", Mood::Curious);
        assert_eq!(msg.speaker, Speaker::Ai);
        assert_eq!(msg.mood, Some(Mood::Curious));
        assert!(!msg.is_user());
    }

    #[test]
    fn test_feedback_only_on_user_messages() {
        let feedback = Feedback {
            clarity: Some(4.0),
            ..Default::default()
        };
        let user = Message::user(MessageId(2), "I like cats").with_feedback(feedback.clone());
        let ai = Message::ai(MessageId(3), "Why?", Mood::Calm).with_feedback(feedback);
        assert!(user.feedback.is_some());
        assert!(ai.feedback.is_none());
    }

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        let msg = Message::user(MessageId(4), "  I   like\tdogs \n too ");
        assert_eq!(msg.word_count(), 4);
    }

    #[test]
    fn test_history_entry_wire_format() {
        let entry = Message::ai(MessageId(5), "Tell me more", Mood::Supportive).to_history_entry();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["speaker"], "ai");
        assert_eq!(json["text"], "Tell me more");
    }
}
