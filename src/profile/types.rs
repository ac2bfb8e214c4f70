use crate::EchoesError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity key of a learner in the profile store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnglishProficiency {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for EnglishProficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EnglishProficiency::Beginner => "Beginner",
            EnglishProficiency::Intermediate => "Intermediate",
            EnglishProficiency::Advanced => "Advanced",
        };
        f.write_str(label)
    }
}

impl FromStr for EnglishProficiency {
    type Err = EchoesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(EnglishProficiency::Beginner),
            "intermediate" => Ok(EnglishProficiency::Intermediate),
            "advanced" => Ok(EnglishProficiency::Advanced),
            other => Err(EchoesError::Config(format!("Unknown proficiency: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcademicLevel {
    #[serde(rename = "High School")]
    HighSchool,
    Undergraduate,
    Graduate,
    #[serde(rename = "Post-graduate")]
    PostGraduate,
}

impl fmt::Display for AcademicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AcademicLevel::HighSchool => "High School",
            AcademicLevel::Undergraduate => "Undergraduate",
            AcademicLevel::Graduate => "Graduate",
            AcademicLevel::PostGraduate => "Post-graduate",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub english_proficiency: EnglishProficiency,
    pub academic_level: AcademicLevel,
    pub goals: String,
}

impl FromStr for AcademicLevel {
    type Err = EchoesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "highschool" => Ok(AcademicLevel::HighSchool),
            "undergraduate" => Ok(AcademicLevel::Undergraduate),
            "graduate" => Ok(AcademicLevel::Graduate),
            "postgraduate" => Ok(AcademicLevel::PostGraduate),
            _ => Err(EchoesError::Config(format!("Unknown academic level: {}", s))),
        }
    }
}

/// Unique words used in one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexicalSample {
    pub date: NaiveDate,
    pub unique_words: usize,
}

/// Speaking speed observed on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluencySample {
    pub date: NaiveDate,
    pub words_per_minute: f32,
}

pub const DEFAULT_CONFIDENCE: u8 = 75;

/// The statistics document behind the progress dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileStats {
    pub sessions_total: u64,
    /// Whole minutes practised across all sessions
    pub total_minutes: u64,
    pub lexical_richness: Vec<LexicalSample>,
    pub fluency: Vec<FluencySample>,
    /// Self-rated confidence, 0..=100
    pub confidence: u8,
}

impl Default for ProfileStats {
    fn default() -> Self {
        Self {
            sessions_total: 0,
            total_minutes: 0,
            lexical_richness: Vec::new(),
            fluency: Vec::new(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl ProfileStats {
    /// Merge an incremental update into the document
    ///
    /// Counters are added; the lexical sample is appended with set-union
    /// semantics, so an identical sample already present is kept once.
    pub fn apply(&mut self, update: &StatsUpdate) {
        self.sessions_total += update.sessions;
        self.total_minutes += update.minutes;
        if let Some(sample) = &update.lexical_sample {
            if !self.lexical_richness.contains(sample) {
                self.lexical_richness.push(sample.clone());
            }
        }
    }
}

/// Incremental change produced at the end of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdate {
    pub sessions: u64,
    pub minutes: u64,
    pub lexical_sample: Option<LexicalSample>,
}

impl StatsUpdate {
    /// One finished session of `minutes` with `unique_words` distinct words
    pub fn session(minutes: u64, unique_words: usize, date: NaiveDate) -> Self {
        Self {
            sessions: 1,
            minutes,
            lexical_sample: Some(LexicalSample { date, unique_words }),
        }
    }
}

/// Headline numbers for the progress dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_sessions: u64,
    pub average_session_minutes: f64,
    pub latest_unique_words: Option<usize>,
    pub confidence: u8,
    pub lexical_richness: Vec<LexicalSample>,
}

impl From<&ProfileStats> for DashboardSummary {
    fn from(stats: &ProfileStats) -> Self {
        let average_session_minutes = if stats.sessions_total == 0 {
            0.0
        } else {
            stats.total_minutes as f64 / stats.sessions_total as f64
        };

        Self {
            total_sessions: stats.sessions_total,
            average_session_minutes,
            latest_unique_words: stats.lexical_richness.last().map(|s| s.unique_words),
            confidence: stats.confidence,
            lexical_richness: stats.lexical_richness.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_apply_increments_counters() {
        let mut stats = ProfileStats::default();
        stats.apply(&StatsUpdate::session(12, 40, day(1)));
        stats.apply(&StatsUpdate::session(3, 25, day(2)));

        assert_eq!(stats.sessions_total, 2);
        assert_eq!(stats.total_minutes, 15);
        assert_eq!(stats.lexical_richness.len(), 2);
        assert_eq!(stats.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_identical_sample_is_not_duplicated() {
        let mut stats = ProfileStats::default();
        stats.apply(&StatsUpdate::session(1, 5, day(4)));
        stats.apply(&StatsUpdate::session(1, 5, day(4)));

        assert_eq!(stats.sessions_total, 2);
        assert_eq!(stats.lexical_richness.len(), 1);
    }

    #[test]
    fn test_dashboard_summary() {
        let empty = DashboardSummary::from(&ProfileStats::default());
        assert_eq!(empty.average_session_minutes, 0.0);
        assert!(empty.latest_unique_words.is_none());

        let mut stats = ProfileStats::default();
        stats.apply(&StatsUpdate::session(10, 30, day(1)));
        stats.apply(&StatsUpdate::session(5, 42, day(2)));
        let summary = DashboardSummary::from(&stats);
        assert_eq!(summary.total_sessions, 2);
        assert_eq!(summary.average_session_minutes, 7.5);
        assert_eq!(summary.latest_unique_words, Some(42));
    }

    #[test]
    fn test_stats_document_tolerates_missing_fields() {
        let stats: ProfileStats = serde_json::from_str(r#"{"sessionsTotal":3}"#).unwrap();
        assert_eq!(stats.sessions_total, 3);
        assert_eq!(stats.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_parse_profile_levels() {
        assert_eq!("Advanced".parse::<EnglishProficiency>().unwrap(), EnglishProficiency::Advanced);
        assert_eq!("high-school".parse::<AcademicLevel>().unwrap(), AcademicLevel::HighSchool);
        assert_eq!("Post-graduate".parse::<AcademicLevel>().unwrap(), AcademicLevel::PostGraduate);
        assert!("fluent".parse::<EnglishProficiency>().is_err());
    }

    #[test]
    fn test_academic_level_labels() {
        let json = serde_json::to_string(&AcademicLevel::HighSchool).unwrap();
        assert_eq!(json, "\"High School\"");
        assert_eq!(AcademicLevel::PostGraduate.to_string(), "Post-graduate");
    }
}
