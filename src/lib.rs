//! # Booksum
//!
//! A terminal application for structured summarisation of books and long-form text using LLMs.
//!
//! ## Features
//!
//! - **Structured Intelligence**: Returns typed `BookSummary` structs with key points, themes, author and genre
//! - **Validated Output**: The JSON schema is derived from the struct and every response is checked against it
//! - **Conversational Context**: Prior turns of the session are sent along with each new text
//! - **Provider Agnostic**: Supports Gemini via rstructor and OpenAI-compatible APIs

pub mod agent;
pub mod config;
pub mod export;
pub mod llm;
pub mod prompt;
pub mod session;
pub mod summary;
pub mod ui;

pub use agent::{AgentError, Generator, SummaryAgent};
pub use config::Config;
pub use export::DownloadArtifact;
pub use session::{ConversationTurn, Role, SessionState};
pub use summary::BookSummary;
