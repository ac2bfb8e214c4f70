//! End-of-session aggregation

use super::mode::InteractionMode;
use crate::messages::Message;
use crate::profile::StatsUpdate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use uuid::Uuid;

/// How whitespace tokens are compared when counting unique words
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordCasePolicy {
    /// "Cats" and "cats" are different words
    #[default]
    Sensitive,
    /// Tokens are lower-cased first
    Insensitive,
}

/// Distinct whitespace tokens across `messages`
pub fn unique_word_count<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    policy: WordCasePolicy,
) -> usize {
    let mut words: HashSet<String> = HashSet::new();
    for message in messages {
        for token in message.text.split_whitespace() {
            let word = match policy {
                WordCasePolicy::Sensitive => token.to_string(),
                WordCasePolicy::Insensitive => token.to_lowercase(),
            };
            words.insert(word);
        }
    }
    words.len()
}

/// Whole minutes in `elapsed`, rounded down
pub fn whole_minutes(elapsed: Duration) -> u64 {
    elapsed.as_secs() / 60
}

/// Why no statistics were written at session end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    NoUserTurns,
    NoUserIdentity,
    NoStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status", content = "reason")]
pub enum StatsWrite {
    /// The update was handed to the store; it may still fail
    Dispatched,
    Skipped(SkipReason),
}

impl StatsWrite {
    pub fn was_dispatched(&self) -> bool {
        matches!(self, StatsWrite::Dispatched)
    }
}

/// What a finished session amounted to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub mode: InteractionMode,
    pub user_turns: usize,
    pub elapsed_minutes: u64,
    pub user_word_count: usize,
    pub unique_words: usize,
    pub stats_write: StatsWrite,
}

impl SessionSummary {
    /// The store update describing this session
    pub fn stats_update(&self, date: NaiveDate) -> StatsUpdate {
        StatsUpdate::session(self.elapsed_minutes, self.unique_words, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{MessageId, Mood};

    fn user(text: &str) -> Message {
        Message::user(MessageId(1), text)
    }

    #[test]
    fn test_unique_words_case_sensitive() {
        let messages = [user("I like cats"), user("I like dogs too")];
        assert_eq!(unique_word_count(&messages, WordCasePolicy::Sensitive), 5);

        let mixed = [user("Cats cats"), user("CATS")];
        assert_eq!(unique_word_count(&mixed, WordCasePolicy::Sensitive), 3);
    }

    #[test]
    fn test_unique_words_case_insensitive() {
        let mixed = [user("Cats cats"), user("CATS  and\tdogs")];
        assert_eq!(unique_word_count(&mixed, WordCasePolicy::Insensitive), 3);
    }

    #[test]
    fn test_unique_words_empty() {
        let none: [Message; 0] = [];
        assert_eq!(unique_word_count(&none, WordCasePolicy::Sensitive), 0);
        let blank = [Message::ai(MessageId(2), "   ", Mood::Calm)];
        assert_eq!(unique_word_count(&blank, WordCasePolicy::Sensitive), 0);
    }

    #[test]
    fn test_whole_minutes_floors() {
        assert_eq!(whole_minutes(Duration::from_secs(59)), 0);
        assert_eq!(whole_minutes(Duration::from_secs(60)), 1);
        assert_eq!(whole_minutes(Duration::from_secs(179)), 2);
    }

    #[test]
    fn test_summary_to_update() {
        let summary = SessionSummary {
            session_id: Uuid::new_v4(),
            mode: InteractionMode::Agentic,
            user_turns: 2,
            elapsed_minutes: 3,
            user_word_count: 7,
            unique_words: 5,
            stats_write: StatsWrite::Dispatched,
        };
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let update = summary.stats_update(date);
        assert_eq!(update.sessions, 1);
        assert_eq!(update.minutes, 3);
        assert_eq!(update.lexical_sample.unwrap().unique_words, 5);
    }
}
