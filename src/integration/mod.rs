//! Integration layer connecting the orchestrator to concrete services
//!
//! This module provides:
//! - Application configuration from the environment
//! - Construction of a session with Gemini, system speech engines and the
//!   JSON stats store

pub mod config;
pub mod session;

pub use config::{AppConfig, DEFAULT_STATS_FILE};
pub use session::{build_session, load_dashboard, Session};
