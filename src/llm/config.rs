//! Configuration for the hosted Gemini model

use crate::{EchoesError, Result};
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Configuration for the Gemini REST client
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Models endpoint, without a trailing slash
    pub base_url: String,

    /// Temperature for sampling (0.0 = deterministic, 2.0 = most creative)
    pub temperature: f32,

    /// Optional per-request HTTP timeout
    pub timeout: Option<Duration>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            timeout: None,
        }
    }
}

impl GeminiConfig {
    /// Create a new configuration with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set a request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Full `generateContent` URL for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(EchoesError::Config("Gemini API key is required".into()));
        }
        if self.model.trim().is_empty() {
            return Err(EchoesError::Config("Gemini model is required".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(EchoesError::Config(format!(
                "Gemini base URL must be http(s): {}",
                self.base_url
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(EchoesError::Config(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeminiConfig::default();
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
        assert!(config.timeout.is_none());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = GeminiConfig::new("secret")
            .with_model("gemini-2.0-flash")
            .with_base_url("http://localhost:8080/models/")
            .with_timeout(Duration::from_secs(20));

        assert!(config.validate().is_ok());
        assert_eq!(
            config.endpoint(),
            "http://localhost:8080/models/gemini-2.0-flash:generateContent?key=secret"
        );
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        let config = GeminiConfig::new("secret").with_temperature(3.5);
        assert!(matches!(config.validate(), Err(EchoesError::Config(_))));
    }
}
