//! Request/response contracts for the auxiliary prompt flows
//!
//! These flows are not part of the turn cycle. They back the narrative
//! scaffolding, rubric scoring and self-reflection features of the app.

use crate::profile::UserProfile;
use serde::{Deserialize, Serialize};

/// Ask for a sentence starter built from the learner's previous input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeScaffoldRequest {
    pub previous_input: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeScaffold {
    pub narrative_scaffold: String,
}

/// Score a learner response against a Speaking-of-Self rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricScoreRequest {
    pub response: String,
    pub rubric_criteria: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricScore {
    pub score: f64,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfReflectionPromptsRequest {
    pub user_profile: UserProfile,
    pub topic: String,
    pub number_of_prompts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfReflectionPrompts {
    pub prompts: Vec<String>,
}
