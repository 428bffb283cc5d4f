//! Prompt construction: the fixed instruction text and the message sequence.

use crate::session::{ConversationTurn, Role};
use crate::summary::BookSummary;
use serde::{Deserialize, Serialize};

/// Persona used when the configuration does not set one
pub const DEFAULT_PERSONA: &str = "You are a professional book summarizer.";

/// Role of a message sent to the generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One message of the prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&ConversationTurn> for PromptMessage {
    fn from(turn: &ConversationTurn) -> Self {
        match turn.role {
            Role::Human => PromptMessage::user(turn.content.clone()),
            Role::Assistant => PromptMessage::assistant(turn.content.clone()),
        }
    }
}

/// Build the system instruction, embedding the summary schema verbatim
pub fn system_prompt(persona: &str) -> String {
    format!(
        r#"{}

1. Read the input and extract keypoints.
2. Condense ideas in plain English.
3. Highlight themes, key events, or arguments.

Return JSON only in this format:

{}

Do not include any markdown formatting, code blocks, or explanations. Only output the raw JSON object."#,
        persona.trim(),
        BookSummary::json_schema()
    )
}

/// System instruction, then prior turns in order, then the new input
pub fn build_messages(
    persona: &str,
    history: &[ConversationTurn],
    input: &str,
) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(PromptMessage::system(system_prompt(persona)));
    messages.extend(history.iter().map(PromptMessage::from));
    messages.push(PromptMessage::user(input));
    messages
}
