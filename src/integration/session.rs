//! Wiring of concrete collaborators into a session
//!
//! Connects all components: Gemini -> Orchestrator -> TTS / stats store

use crate::conversation::{Collaborators, Orchestrator, OrchestratorHandle};
use crate::integration::config::AppConfig;
use crate::llm::GeminiClient;
use crate::profile::{DashboardSummary, JsonFileStatsStore, StatsStore, UserId};
use crate::speech::{CommandRecognizer, CommandSpeaker};
use crate::Result;
use std::sync::Arc;
use tracing::info;

/// A configured session that has not been started yet
pub struct Session {
    pub orchestrator: Orchestrator,
    pub handle: OrchestratorHandle,
    /// Shared with the orchestrator; also serves the auxiliary flows
    pub client: Arc<GeminiClient>,
}

/// Build the Gemini client, speech engines and stats store for `config`
pub fn build_session(config: &AppConfig) -> Result<Session> {
    config.validate()?;

    let client = Arc::new(GeminiClient::new(config.gemini.clone())?);
    let store = Arc::new(JsonFileStatsStore::new(config.stats_file.clone()));

    let mut collaborators = Collaborators::new(client.clone(), client.clone())
        .with_stats_store(store);

    if config.enable_speech_output {
        let speaker = CommandSpeaker::start(config.speaker.clone())?;
        info!("Speaking replies with {}", config.speaker.program);
        collaborators = collaborators.with_speech_output(Arc::new(speaker));
    }

    if let Some(listener) = &config.listener {
        let recognizer = CommandRecognizer::new(listener.clone())?;
        collaborators = collaborators.with_recognizer(Box::new(recognizer));
    }

    let (orchestrator, handle) = Orchestrator::new(config.session.clone(), collaborators)?;
    info!(
        "Session ready: mode={}, model={}",
        config.session.mode, config.gemini.model
    );

    Ok(Session {
        orchestrator,
        handle,
        client,
    })
}

/// Dashboard numbers for `user` from the configured stats file
pub async fn load_dashboard(config: &AppConfig, user: &UserId) -> Result<Option<DashboardSummary>> {
    let store = JsonFileStatsStore::new(config.stats_file.clone());
    let stats = store.load(user).await?;
    Ok(stats.as_ref().map(DashboardSummary::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GeminiConfig;
    use crate::profile::StatsUpdate;
    use chrono::NaiveDate;

    #[test]
    fn test_build_requires_api_key() {
        assert!(build_session(&AppConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_build_session_seeds_greeting_on_start() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default()
            .with_gemini(GeminiConfig::new("test-key").with_base_url("http://127.0.0.1:9"))
            .with_stats_file(dir.path().join("stats.json"));

        let session = build_session(&config).unwrap();
        session.orchestrator.start().unwrap();
        assert_eq!(session.handle.state().messages().len(), 1);
        assert_eq!(session.client.config().api_key, "test-key");
    }

    #[tokio::test]
    async fn test_load_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default().with_stats_file(dir.path().join("stats.json"));
        let user = UserId::new("learner");

        assert!(load_dashboard(&config, &user).await.unwrap().is_none());

        let store = JsonFileStatsStore::new(config.stats_file.clone());
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        store.apply(&user, StatsUpdate::session(6, 20, date)).await.unwrap();

        let summary = load_dashboard(&config, &user).await.unwrap().unwrap();
        assert_eq!(summary.total_sessions, 1);
        assert_eq!(summary.average_session_minutes, 6.0);
        assert_eq!(summary.latest_unique_words, Some(20));
    }
}
