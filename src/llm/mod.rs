//! Hosted language-model flows
//!
//! # Architecture
//!
//! - **generator**: the `ResponseGenerator` / `ReflectionGenerator` traits the
//!   orchestrator depends on, plus their wire types
//! - **flows**: wire types for scaffolding, rubric scoring and self-reflection
//! - **prompts**: prompt templates for every flow
//! - **config**: Gemini endpoint configuration
//! - **gemini**: REST client implementing all flows
//!
//! # Usage
//!
//! ```rust,ignore
//! use echoes::llm::{GeminiClient, GeminiConfig, ResponseGenerator, ResponseRequest};
//!
//! let client = GeminiClient::new(GeminiConfig::new(api_key))?;
//! let reply = client.generate_response(request).await?;
//! println!("{} ({})", reply.response, reply.mood);
//! ```

pub mod config;
pub mod flows;
pub mod gemini;
pub mod generator;
pub mod prompts;

// Re-export commonly used types
pub use config::{GeminiConfig, DEFAULT_GEMINI_MODEL};
pub use flows::{
    NarrativeScaffold, NarrativeScaffoldRequest, RubricScore, RubricScoreRequest,
    SelfReflectionPrompts, SelfReflectionPromptsRequest,
};
pub use gemini::GeminiClient;
pub use generator::{
    GeneratedReflection, GeneratedReply, ReflectionGenerator, ReflectionRequest,
    ResponseGenerator, ResponseRequest,
};
