//! Gemini REST client for the conversation prompt flows
//!
//! Each flow renders its prompt template, asks the model for a JSON answer
//! and deserialises that answer into the flow's response type.

use crate::llm::config::GeminiConfig;
use crate::llm::flows::{
    NarrativeScaffold, NarrativeScaffoldRequest, RubricScore, RubricScoreRequest,
    SelfReflectionPrompts, SelfReflectionPromptsRequest,
};
use crate::llm::generator::{
    GeneratedReflection, GeneratedReply, ReflectionGenerator, ReflectionRequest,
    ResponseGenerator, ResponseRequest,
};
use crate::llm::prompts;
use crate::{EchoesError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// Hosted-model client implementing every prompt flow
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EchoesError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Run one flow: send `prompt`, parse the JSON answer as `T`
    async fn run_flow<T: DeserializeOwned>(&self, flow: &'static str, prompt: String) -> Result<T> {
        let started = Instant::now();
        let body = GenerateContentRequest::json_prompt(prompt, self.config.temperature);

        let response = self
            .client
            .post(self.config.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| EchoesError::Generator(format!("{} request failed: {}", flow, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(flow, status, &body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| EchoesError::Generator(format!("{} returned malformed body: {}", flow, e)))?;

        let text = extract_text(parsed)
            .ok_or_else(|| EchoesError::Generator(format!("{} returned no candidates", flow)))?;

        debug!(
            "{} completed in {}ms ({} chars)",
            flow,
            started.elapsed().as_millis(),
            text.len()
        );

        serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
            warn!("{} answer did not match its schema: {}", flow, e);
            EchoesError::Serialization(format!("{}: {}", flow, e))
        })
    }

    pub async fn generate_narrative_scaffold(
        &self,
        request: &NarrativeScaffoldRequest,
    ) -> Result<NarrativeScaffold> {
        self.run_flow(
            "generateNarrativeScaffold",
            prompts::narrative_scaffold_prompt(request),
        )
        .await
    }

    pub async fn evaluate_rubric_score(&self, request: &RubricScoreRequest) -> Result<RubricScore> {
        self.run_flow(
            "evaluateSpeakingSelfRubricScore",
            prompts::rubric_score_prompt(request),
        )
        .await
    }

    pub async fn generate_self_reflection_prompts(
        &self,
        request: &SelfReflectionPromptsRequest,
    ) -> Result<SelfReflectionPrompts> {
        let mut result: SelfReflectionPrompts = self
            .run_flow(
                "generateSelfReflectionPrompts",
                prompts::self_reflection_prompts_prompt(request),
            )
            .await?;
        result.prompts.truncate(request.number_of_prompts as usize);
        Ok(result)
    }
}

#[async_trait]
impl ResponseGenerator for GeminiClient {
    async fn generate_response(&self, request: ResponseRequest) -> Result<GeneratedReply> {
        let reply: GeneratedReply = self
            .run_flow(
                "generateConversationalResponse",
                prompts::conversational_response_prompt(&request),
            )
            .await?;

        if reply.response.trim().is_empty() {
            return Err(EchoesError::Generator("model returned an empty reply".into()));
        }
        Ok(reply)
    }
}

#[async_trait]
impl ReflectionGenerator for GeminiClient {
    async fn generate_reflection(
        &self,
        request: ReflectionRequest,
    ) -> Result<GeneratedReflection> {
        let reflection: GeneratedReflection = self
            .run_flow("generateReflection", prompts::reflection_prompt(&request))
            .await
            .map_err(|e| EchoesError::Reflection(e.to_string()))?;

        if reflection.reflection.trim().is_empty() {
            return Err(EchoesError::Reflection("model returned an empty reflection".into()));
        }
        Ok(reflection)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn json_prompt(prompt: String, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature,
                response_mime_type: "application/json".to_string(),
            },
        }
    }
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|part| part.text)
}

/// Drop a surrounding ```json fence if the model added one anyway
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn map_http_error(flow: &str, status: StatusCode, body: &str) -> EchoesError {
    let detail = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| match (wrapper.error.status, wrapper.error.message) {
            (Some(status), Some(message)) => Some(format!("{}: {}", status, message)),
            (None, Some(message)) => Some(message),
            (Some(status), None) => Some(status),
            (None, None) => None,
        })
        .unwrap_or_else(|| body.chars().take(200).collect());

    EchoesError::Generator(format!("{} failed with HTTP {}: {}", flow, status.as_u16(), detail))
}
