//! Summary agent: build the prompt, call the generator, validate the reply.
//!
//! The generator is a free-text model with no structured-output guarantee, so
//! every reply is validated locally before it reaches the session.

pub use crate::summary::BookSummary;

use crate::config::{Config, ConfigError};
use crate::prompt::{self, PromptMessage};
use crate::session::{ConversationTurn, SessionState};
use crate::summary::SummaryError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    GenerationFailed(String),
    #[error("failed to validate response: {0}")]
    ValidationFailed(#[from] SummaryError),
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// The external text-generation service
#[async_trait]
pub trait Generator: Send + Sync {
    /// One round trip: ordered messages in, raw text out
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, AgentError>;
}

pub struct SummaryAgent {
    generator: Arc<dyn Generator>,
    persona: String,
}

impl SummaryAgent {
    pub fn new(generator: Arc<dyn Generator>, persona: impl Into<String>) -> Self {
        Self {
            generator,
            persona: persona.into(),
        }
    }

    /// Build an agent backed by the provider named in the config
    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        let generator = crate::llm::generator_from_config(config)?;
        Ok(Self::new(generator, config.agent.persona.clone()))
    }

    /// Summarise `input` given the prior conversation.
    ///
    /// Does not touch any session; the caller records the outcome.
    pub async fn generate(
        &self,
        input: &str,
        history: &[ConversationTurn],
    ) -> Result<BookSummary, AgentError> {
        let messages = prompt::build_messages(&self.persona, history, input);
        tracing::debug!(
            messages = messages.len(),
            input_chars = input.chars().count(),
            "requesting summary"
        );

        let raw = self.generator.complete(&messages).await?;
        tracing::trace!(response = %raw, "raw LLM response");

        let cleaned = strip_markdown_json(&raw);
        let summary = BookSummary::from_json(cleaned).map_err(|e| {
            tracing::warn!(error = %e, "LLM response failed validation");
            e
        })?;

        Ok(summary)
    }

    /// Run one request cycle against a session.
    ///
    /// Blank input is a no-op returning `Ok(None)`. Otherwise the human turn is
    /// recorded first; on success the narrative summary is appended as the
    /// assistant turn and replaces the session's last summary. A failed call
    /// leaves the human turn in place.
    pub async fn submit(
        &self,
        session: &mut SessionState,
        input: &str,
    ) -> Result<Option<BookSummary>, AgentError> {
        if !session.append_human(input) {
            tracing::debug!("ignoring blank input");
            return Ok(None);
        }

        let prior = &session.transcript()[..session.len() - 1];
        let summary = self.generate(input, prior).await?;

        session.append_assistant(&summary.summary);
        session.set_last_summary(summary.clone());
        tracing::info!(title = %summary.title, turns = session.len(), "summary generated");

        Ok(Some(summary))
    }
}

/// Strip a markdown code block wrapper from a JSON response
fn strip_markdown_json(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(fenced) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = fenced.strip_prefix("json").unwrap_or(fenced);

    match body.rfind("```") {
        Some(end_idx) => body[..end_idx].trim(),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::MessageRole;
    use crate::session::Role;
    use std::sync::Mutex;

    const HEMINGWAY: &str = r#"{"title":"The Old Man and the Sea","summary":"An aging fisherman battles a giant marlin.","key_points":["Perseverance"],"themes":["Struggle"],"author":"Ernest Hemingway","genre":"Novella","word_count":9}"#;

    /// Replays canned replies in order and records every request
    struct MockGenerator {
        replies: Mutex<Vec<Result<String, String>>>,
        calls: Mutex<Vec<Vec<PromptMessage>>>,
    }

    impl MockGenerator {
        fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
            let mut replies: Vec<Result<String, String>> = replies
                .into_iter()
                .map(|r| r.map(str::to_string).map_err(str::to_string))
                .collect();
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Generator for MockGenerator {
        async fn complete(&self, messages: &[PromptMessage]) -> Result<String, AgentError> {
            self.calls.lock().unwrap().push(messages.to_vec());
            match self.replies.lock().unwrap().pop() {
                Some(Ok(text)) => Ok(text),
                Some(Err(e)) => Err(AgentError::GenerationFailed(e)),
                None => Err(AgentError::GenerationFailed("no more mock replies".into())),
            }
        }
    }

    fn summary_json(title: &str, summary: &str) -> String {
        serde_json::to_string(&BookSummary::new(title, summary)).unwrap()
    }

    fn agent(generator: &Arc<MockGenerator>) -> SummaryAgent {
        SummaryAgent::new(generator.clone(), prompt::DEFAULT_PERSONA)
    }

    #[tokio::test]
    async fn generate_returns_validated_summary() {
        let generator = MockGenerator::new(vec![Ok(HEMINGWAY)]);
        let summary = agent(&generator).generate("text", &[]).await.unwrap();

        assert_eq!(summary.title, "The Old Man and the Sea");
        assert_eq!(summary.genre.as_deref(), Some("Novella"));
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn generate_accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", HEMINGWAY);
        let generator = MockGenerator::new(vec![Ok(fenced.as_str())]);
        let summary = agent(&generator).generate("text", &[]).await.unwrap();
        assert_eq!(summary.word_count, Some(9));
    }

    #[tokio::test]
    async fn generate_surfaces_validation_errors() {
        let generator = MockGenerator::new(vec![Ok("Sure! Here is a summary.")]);
        let err = agent(&generator).generate("text", &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::ValidationFailed(_)));

        let generator = MockGenerator::new(vec![Ok("")]);
        let err = agent(&generator).generate("text", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::ValidationFailed(SummaryError::Empty)
        ));
    }

    #[tokio::test]
    async fn generate_surfaces_generation_errors_without_retry() {
        let generator = MockGenerator::new(vec![Err("503 unavailable"), Ok(HEMINGWAY)]);
        let err = agent(&generator).generate("text", &[]).await.unwrap_err();

        assert!(matches!(err, AgentError::GenerationFailed(ref m) if m == "503 unavailable"));
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let generator = MockGenerator::new(vec![Ok(HEMINGWAY)]);
        let mut session = SessionState::new();

        let result = agent(&generator).submit(&mut session, "  \n\t ").await.unwrap();

        assert!(result.is_none());
        assert!(session.is_empty());
        assert!(session.last_summary().is_none());
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn successful_cycles_alternate_turns() {
        let replies: Vec<String> = (1..=3)
            .map(|i| summary_json(&format!("Book {i}"), &format!("Digest {i}")))
            .collect();
        let generator = MockGenerator::new(replies.iter().map(|r| Ok(r.as_str())).collect());
        let agent = agent(&generator);
        let mut session = SessionState::new();

        for i in 1..=3 {
            agent
                .submit(&mut session, &format!("Text {i}"))
                .await
                .unwrap();
        }

        assert_eq!(session.len(), 6);
        for (i, turn) in session.transcript().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::Human } else { Role::Assistant };
            assert_eq!(turn.role, expected);
        }
        assert_eq!(session.transcript()[5].content, "Digest 3");
    }

    #[tokio::test]
    async fn last_summary_tracks_most_recent_call() {
        let first = summary_json("First", "one");
        let second = summary_json("Second", "two");
        let generator = MockGenerator::new(vec![Ok(first.as_str()), Ok(second.as_str())]);
        let agent = agent(&generator);
        let mut session = SessionState::new();

        agent.submit(&mut session, "a").await.unwrap();
        assert_eq!(session.last_summary().unwrap().title, "First");
        agent.submit(&mut session, "b").await.unwrap();
        assert_eq!(
            session.last_summary(),
            Some(&BookSummary::new("Second", "two"))
        );
    }

    #[tokio::test]
    async fn history_sent_excludes_the_new_input() {
        let first = summary_json("First", "one");
        let second = summary_json("Second", "two");
        let generator = MockGenerator::new(vec![Ok(first.as_str()), Ok(second.as_str())]);
        let agent = agent(&generator);
        let mut session = SessionState::new();

        agent.submit(&mut session, "first text").await.unwrap();
        agent.submit(&mut session, "second text").await.unwrap();

        let calls = generator.calls.lock().unwrap();
        let contents: Vec<(MessageRole, &str)> = calls[1]
            .iter()
            .skip(1)
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            contents,
            vec![
                (MessageRole::User, "first text"),
                (MessageRole::Assistant, "one"),
                (MessageRole::User, "second text"),
            ]
        );
    }

    #[tokio::test]
    async fn failed_call_keeps_human_turn() {
        let ok = summary_json("Recovered", "after failure");
        let generator = MockGenerator::new(vec![Err("timeout"), Ok("{not json"), Ok(ok.as_str())]);
        let agent = agent(&generator);
        let mut session = SessionState::new();
        session.set_last_summary(BookSummary::new("Earlier", "kept"));

        assert!(agent.submit(&mut session, "one").await.is_err());
        assert!(agent.submit(&mut session, "two").await.is_err());

        let roles: Vec<Role> = session.transcript().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::Human, Role::Human]);
        assert_eq!(session.last_summary().unwrap().title, "Earlier");

        agent.submit(&mut session, "three").await.unwrap();
        let roles: Vec<Role> = session.transcript().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::Human, Role::Human, Role::Human, Role::Assistant]);
        assert_eq!(session.last_summary().unwrap().title, "Recovered");
    }

    #[test]
    fn strip_markdown_json_variants() {
        assert_eq!(strip_markdown_json("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_markdown_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_markdown_json("```\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_markdown_json("```json {\"a\":1}"), "```json {\"a\":1}");
    }
}
