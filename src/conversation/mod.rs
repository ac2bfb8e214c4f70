//! Conversation sessions
//!
//! # Architecture
//!
//! - **mode**: interaction modes and their greetings
//! - **config**: per-session settings
//! - **state**: shared session state, commands and events
//! - **stats**: unique-word counting and the end-of-session summary
//! - **orchestrator**: the event loop sequencing turns, reflections,
//!   speech capture and teardown
//!
//! # Usage
//!
//! ```rust,ignore
//! use echoes::conversation::{Collaborators, Orchestrator, SessionConfig};
//!
//! let (orchestrator, mut handle) = Orchestrator::new(config, collaborators)?;
//! orchestrator.start()?;
//! handle.submit_text("I visited my grandmother last weekend").await?;
//! while let Some(event) = handle.recv_event().await {
//!     // render
//! }
//! ```

pub mod config;
pub mod mode;
pub mod orchestrator;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use config::SessionConfig;
pub use mode::{InteractionMode, ModeDetails};
pub use orchestrator::{
    Collaborators, Orchestrator, OrchestratorHandle, SpeechEventSender, FALLBACK_REPLY,
};
pub use state::{
    RejectReason, SessionCommand, SessionError, SessionEvent, SessionState, SharedSessionState,
};
pub use stats::{unique_word_count, SessionSummary, SkipReason, StatsWrite, WordCasePolicy};
