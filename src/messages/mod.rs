pub mod storage;
pub mod types;

pub use storage::Transcript;
pub use types::{Feedback, HistoryEntry, Message, MessageId, Mood, Speaker};
