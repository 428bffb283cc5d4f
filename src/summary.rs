//! BookSummary struct - the structured output validated from the LLM response.

use lazy_static::lazy_static;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    /// Pretty-printed JSON schema of [`BookSummary`], embedded in the system prompt.
    static ref SUMMARY_SCHEMA: String = serde_json::to_string_pretty(&schemars::schema_for!(BookSummary))
        .unwrap_or_default();
}

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("response is empty")]
    Empty,
    #[error("response is not a valid summary: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("required field `{0}` is blank")]
    BlankField(&'static str),
}

// Doc comments here become schema descriptions sent to the LLM.
// Nothing on the wire enforces the schema; responses go through `from_json`.

/// Structured summary of a book or other long-form text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BookSummary {
    /// The title of the book
    pub title: String,
    /// A comprehensive summary of the book
    pub summary: String,
    /// Key takeaways from the book
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Main themes discussed in the book
    #[serde(default)]
    pub themes: Vec<String>,
    /// Author of the book if mentioned
    #[serde(default)]
    pub author: Option<String>,
    /// Genre or category of the book
    #[serde(default)]
    pub genre: Option<String>,
    /// Approximate word count of the summary
    #[serde(default)]
    pub word_count: Option<u64>,
}

impl BookSummary {
    /// Create a summary with only the required fields set
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            key_points: Vec::new(),
            themes: Vec::new(),
            author: None,
            genre: None,
            word_count: None,
        }
    }

    /// Parse and validate a raw JSON response.
    ///
    /// All-or-nothing: either every field type checks and the required
    /// fields carry text, or nothing is returned.
    pub fn from_json(text: &str) -> Result<Self, SummaryError> {
        if text.trim().is_empty() {
            return Err(SummaryError::Empty);
        }

        let summary: BookSummary = serde_json::from_str(text)?;
        summary.validate()?;
        Ok(summary)
    }

    /// Check the invariants serde cannot express
    pub fn validate(&self) -> Result<(), SummaryError> {
        if self.title.trim().is_empty() {
            return Err(SummaryError::BlankField("title"));
        }
        if self.summary.trim().is_empty() {
            return Err(SummaryError::BlankField("summary"));
        }
        Ok(())
    }

    /// The JSON schema responses must conform to
    pub fn json_schema() -> &'static str {
        &SUMMARY_SCHEMA
    }
}
