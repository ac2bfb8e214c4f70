//! Learner profiles and the statistics that feed the progress dashboard

pub mod store;
pub mod types;

pub use store::{InMemoryStatsStore, JsonFileStatsStore, StatsStore};
pub use types::{
    AcademicLevel, DashboardSummary, EnglishProficiency, FluencySample, LexicalSample,
    ProfileStats, StatsUpdate, UserId, UserProfile, DEFAULT_CONFIDENCE,
};
