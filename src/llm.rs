//! Generation service backends.
//!
//! Gemini goes through rstructor; OpenAI-compatible endpoints are called
//! directly with reqwest.

use crate::agent::{AgentError, Generator};
use crate::config::Config;
use crate::prompt::{MessageRole, PromptMessage};
use async_trait::async_trait;
use reqwest::Client;
use rstructor::{GeminiClient, GeminiModel, LLMClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Pick the generator for the configured provider
pub fn generator_from_config(config: &Config) -> Result<Arc<dyn Generator>, AgentError> {
    let api_key = config.api_key()?.to_string();
    let timeout = Duration::from_secs(config.agent.timeout_secs);

    let generator: Arc<dyn Generator> = match config.agent.provider.as_str() {
        "openai" => Arc::new(OpenAiGenerator::new(
            &config.api.openai_base_url,
            api_key,
            &config.agent.model,
            config.agent.temperature,
            timeout,
        )?),
        _ => Arc::new(GeminiGenerator::from_config(config)?),
    };

    tracing::debug!(
        provider = %config.agent.provider,
        model = %config.agent.model,
        "generator configured"
    );
    Ok(generator)
}

pub struct GeminiGenerator {
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl GeminiGenerator {
    pub fn new(api_key: String, model: &str, temperature: f32, timeout: Duration) -> Self {
        Self {
            api_key,
            model: model.to_string(),
            temperature,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        Ok(Self::new(
            config.api_key()?.to_string(),
            &config.agent.model,
            config.agent.temperature,
            Duration::from_secs(config.agent.timeout_secs),
        ))
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, AgentError> {
        let client = GeminiClient::new(&self.api_key)
            .map_err(|e| AgentError::GenerationFailed(e.to_string()))?
            .model(parse_gemini_model(&self.model))
            .temperature(self.temperature);

        let prompt = render_prompt(messages);
        let result = tokio::time::timeout(self.timeout, client.generate_with_metadata(&prompt))
            .await
            .map_err(|_| {
                AgentError::GenerationFailed(format!(
                    "no response within {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AgentError::GenerationFailed(e.to_string()))?;

        Ok(result.text)
    }
}

/// Parse a model string into a GeminiModel
fn parse_gemini_model(model: &str) -> GeminiModel {
    match model {
        "gemini-2.0-flash" => GeminiModel::Gemini20Flash,
        "gemini-2.5-flash" => GeminiModel::Gemini25Flash,
        "gemini-2.5-pro" => GeminiModel::Gemini25Pro,
        other => {
            tracing::warn!(model = %other, "unknown Gemini model, using gemini-2.5-flash");
            GeminiModel::Gemini25Flash
        }
    }
}

/// Flatten the message sequence into one prompt for single-prompt clients
fn render_prompt(messages: &[PromptMessage]) -> String {
    let mut system = Vec::new();
    let mut conversation = Vec::new();

    for message in messages {
        match message.role {
            MessageRole::System => system.push(message.content.as_str()),
            MessageRole::User => conversation.push(format!("Human: {}", message.content)),
            MessageRole::Assistant => conversation.push(format!("Assistant: {}", message.content)),
        }
    }

    let mut prompt = system.join("\n\n");
    if !conversation.is_empty() {
        prompt.push_str("\n\n---\n\n");
        prompt.push_str(&conversation.join("\n\n"));
    }
    prompt
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiGenerator {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiGenerator {
    pub fn new(
        base_url: &str,
        api_key: String,
        model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::GenerationFailed(e.to_string()))?;

        Ok(Self {
            client,
            url: completions_url(base_url),
            api_key,
            model: model.to_string(),
            temperature,
        })
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, AgentError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::GenerationFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::GenerationFailed(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::GenerationFailed(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::GenerationFailed("no choices in response".to_string()))?;

        choice
            .message
            .content
            .ok_or_else(|| AgentError::GenerationFailed("no content in response".to_string()))
    }
}

/// Append `/chat/completions` unless the base URL already points there
fn completions_url(base_url: &str) -> String {
    if base_url.ends_with("/chat/completions") {
        base_url.to_string()
    } else {
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }
}
