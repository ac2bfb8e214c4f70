use super::types::{HistoryEntry, Message, MessageId, Mood};

/// Append-only, ordered conversation transcript
///
/// Messages are never edited or removed once pushed. Ids come from a
/// session-local counter so they are unique and creation-ordered.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId(self.next_id)
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &Message {
        let id = self.allocate_id();
        self.messages.push(Message::user(id, text));
        &self.messages[self.messages.len() - 1]
    }

    pub fn push_ai(&mut self, text: impl Into<String>, mood: Mood) -> &Message {
        let id = self.allocate_id();
        self.messages.push(Message::ai(id, text, mood));
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn user_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_user())
    }

    pub fn user_count(&self) -> usize {
        self.user_messages().count()
    }

    /// The last `n` messages as speaker+text pairs, oldest first
    pub fn recent_history(&self, n: usize) -> Vec<HistoryEntry> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..]
            .iter()
            .map(Message::to_history_entry)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
