//! Prompt templates for the hosted model flows
//!
//! Every template ends with an output contract so the model answers with a
//! JSON object matching the flow's response type.

use crate::conversation::InteractionMode;
use crate::llm::flows::{NarrativeScaffoldRequest, RubricScoreRequest, SelfReflectionPromptsRequest};
use crate::llm::generator::{ReflectionRequest, ResponseRequest};
use crate::messages::HistoryEntry;

/// Render history as `- speaker: text` lines
pub fn render_history(history: &[HistoryEntry]) -> String {
    let mut out = String::new();
    for entry in history {
        out.push_str("- ");
        out.push_str(entry.speaker.as_str());
        out.push_str(": ");
        out.push_str(&entry.text);
        out.push('\n');
    }
    out
}

fn mode_guidance() -> String {
    InteractionMode::ALL
        .iter()
        .map(|mode| format!("- {}: {}", mode.as_str(), mode.details().tone))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn conversational_response_prompt(request: &ResponseRequest) -> String {
    format!(
        r#"You are an AI assistant in a conversation with a user. The current conversation mode is '{mode}'.
Your personality should adapt to the mode.
{guidance}

Here is the recent conversation history:
{history}
The user just said: "{input}"

Generate a response that is natural and fits the conversation. Your response should also have a mood.
Possible moods are: calm, curious, supportive.

Respond with a JSON object: {{"response": string, "mood": "calm" | "curious" | "supportive"}}"#,
        mode = request.mode.as_str(),
        guidance = mode_guidance(),
        history = render_history(&request.history),
        input = request.user_input,
    )
}

pub fn reflection_prompt(request: &ReflectionRequest) -> String {
    format!(
        r#"You are an AI assistant that helps users reflect on their conversations.
Analyze the following conversation and generate a single, thought-provoking question or observation to encourage deeper reflection.
Focus on a key theme or feeling that emerged.

Conversation History:
{history}
Generate a reflective prompt. For example: "You spoke about your childhood today. This seems like an important memory. Would you like to explore this more?"

Respond with a JSON object: {{"reflection": string}}"#,
        history = render_history(&request.history),
    )
}

pub fn narrative_scaffold_prompt(request: &NarrativeScaffoldRequest) -> String {
    format!(
        r#"You are an AI assistant designed to help English learners explore their personal narratives. Based on the user's previous input, generate a sentence starter or suggestion that they can edit and refine to better express their thoughts and feelings.

Previous Input: {input}

Respond with a JSON object: {{"narrativeScaffold": string}}"#,
        input = request.previous_input,
    )
}

pub fn rubric_score_prompt(request: &RubricScoreRequest) -> String {
    format!(
        r#"You are an AI assistant specialized in evaluating user responses based on a Speaking-of-Self rubric.

Evaluate the following user response:
{response}

Based on the following rubric criteria:
{criteria}

Provide a score and a justification for the score.

Respond with a JSON object: {{"score": number, "justification": string}}"#,
        response = request.response,
        criteria = request.rubric_criteria,
    )
}

pub fn self_reflection_prompts_prompt(request: &SelfReflectionPromptsRequest) -> String {
    let profile = &request.user_profile;
    format!(
        r#"You are an AI assistant designed to help English learners practice expressing themselves and reflecting on their lives.

Based on the user's profile and the specified topic, generate a list of thought-provoking questions and prompts to encourage self-reflection.

User Profile:
Name: {name}
Age: {age}
English Proficiency: {proficiency}
Academic Level: {academic}
Goals: {goals}

Topic: {topic}
Number of Prompts: {count}

Respond with a JSON object: {{"prompts": [string]}}"#,
        name = profile.name,
        age = profile.age,
        proficiency = profile.english_proficiency,
        academic = profile.academic_level,
        goals = profile.goals,
        topic = request.topic,
        count = request.number_of_prompts,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Speaker;
    use crate::profile::{AcademicLevel, EnglishProficiency, UserProfile};

    #[test]
    fn test_render_history() {
        let history = vec![
            HistoryEntry::new(Speaker::Ai, "Hello!"),
            HistoryEntry::new(Speaker::User, "Hi, I like cats"),
        ];
        assert_eq!(render_history(&history), "- ai: Hello!\n- user: Hi, I like cats\n");
    }

    #[test]
    fn test_response_prompt_mentions_mode_and_input() {
        let request = ResponseRequest {
            user_input: "I moved to Toronto".to_string(),
            mode: InteractionMode::Peer,
            history: vec![HistoryEntry::new(Speaker::User, "I moved to Toronto")],
        };
        let prompt = conversational_response_prompt(&request);
        assert!(prompt.contains("mode is 'peer'"));
        assert!(prompt.contains("The user just said: \"I moved to Toronto\""));
        assert!(prompt.contains("- non-agentic: Be straightforward"));
        assert!(prompt.contains(r#"{"response": string"#));
    }

    #[test]
    fn test_reflection_prompt_includes_history() {
        let request = ReflectionRequest {
            history: vec![HistoryEntry::new(Speaker::User, "My grandmother raised me")],
        };
        let prompt = reflection_prompt(&request);
        assert!(prompt.contains("- user: My grandmother raised me"));
        assert!(prompt.contains(r#"{"reflection": string}"#));
    }

    #[test]
    fn test_self_reflection_prompt_includes_profile() {
        let request = SelfReflectionPromptsRequest {
            user_profile: UserProfile {
                name: "Ana".to_string(),
                age: 19,
                english_proficiency: EnglishProficiency::Intermediate,
                academic_level: AcademicLevel::Undergraduate,
                goals: "Speak up in seminars".to_string(),
            },
            topic: "belonging".to_string(),
            number_of_prompts: 3,
        };
        let prompt = self_reflection_prompts_prompt(&request);
        assert!(prompt.contains("Name: Ana"));
        assert!(prompt.contains("English Proficiency: Intermediate"));
        assert!(prompt.contains("Number of Prompts: 3"));
    }
}
