//! In-memory session state: the conversation transcript and the latest summary.
//!
//! One `SessionState` belongs to one interactive session. It is deliberately a
//! plain value passed by `&mut` into the agent; callers that host several
//! sessions keep one instance per session.

use crate::summary::BookSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
}

/// A single entry of the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    fn new(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            created_at: Utc::now(),
        }
    }

    /// First `limit` characters of the content, with `...` appended when cut
    pub fn preview(&self, limit: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(limit).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}

/// Transcript plus the most recent structured result
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    transcript: Vec<ConversationTurn>,
    last_summary: Option<BookSummary>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a human turn. Blank text is ignored and `false` returned.
    pub fn append_human(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.transcript
            .push(ConversationTurn::new(Role::Human, text.to_string()));
        true
    }

    /// Append an assistant turn holding the narrative summary text only
    pub fn append_assistant(&mut self, summary_text: &str) {
        self.transcript.push(ConversationTurn::new(
            Role::Assistant,
            summary_text.to_string(),
        ));
    }

    /// Replace the last summary; the previous one is dropped
    pub fn set_last_summary(&mut self, summary: BookSummary) {
        self.last_summary = Some(summary);
    }

    /// Forget the transcript and the last summary
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.last_summary = None;
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    pub fn last_summary(&self) -> Option<&BookSummary> {
        self.last_summary.as_ref()
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }
}
